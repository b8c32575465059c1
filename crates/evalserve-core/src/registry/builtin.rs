//! Registry compiled into the binary

/// Built-in eval registrations, `(file name, YAML)`
pub(crate) const BUILTIN_EVALS: &[(&str, &str)] = &[(
    "test.yaml",
    include_str!("../../registry/evals/test.yaml"),
)];

/// Built-in sample files, `(path relative to data/, JSONL)`
pub(crate) const BUILTIN_DATA: &[(&str, &str)] = &[
    (
        "test_match/samples.jsonl",
        include_str!("../../registry/data/test_match/samples.jsonl"),
    ),
    (
        "test_includes/samples.jsonl",
        include_str!("../../registry/data/test_includes/samples.jsonl"),
    ),
    (
        "test_fuzzy_match/samples.jsonl",
        include_str!("../../registry/data/test_fuzzy_match/samples.jsonl"),
    ),
];

pub(crate) fn builtin_data(relative: &str) -> Option<&'static str> {
    BUILTIN_DATA
        .iter()
        .find(|(path, _)| *path == relative)
        .map(|(_, content)| *content)
}
