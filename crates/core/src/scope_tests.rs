use super::*;

#[yare::parameterized(
    unscoped = { "", "foo", "foo" },
    scoped = { "ns", "foo", "ns/foo" },
)]
fn scoped_name_cases(ns: &str, name: &str, expected: &str) {
    assert_eq!(scoped_name(ns, name), expected);
}

#[yare::parameterized(
    no_slash = { "foo", ("", "foo") },
    with_slash = { "ns/foo", ("ns", "foo") },
    nested = { "ns/sub/foo", ("ns", "sub/foo") },
)]
fn split_scoped_name_cases(scoped: &str, expected: (&str, &str)) {
    assert_eq!(split_scoped_name(scoped), expected);
}

#[test]
fn for_project_is_deterministic_for_same_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = RecoveryScope::for_project(dir.path());
    let b = RecoveryScope::for_project(dir.path());
    assert_eq!(a, b);
}

#[test]
fn for_project_differs_across_paths() {
    let dir1 = tempfile::tempdir().expect("tempdir");
    let dir2 = tempfile::tempdir().expect("tempdir");
    let a = RecoveryScope::for_project(dir1.path());
    let b = RecoveryScope::for_project(dir2.path());
    assert_ne!(a, b);
}
