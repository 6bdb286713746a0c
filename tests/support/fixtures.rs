use std::fs;
use std::path::PathBuf;

use course_engine::course::CourseSpec;

pub fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(format!("{}.yml", name));
    path
}

pub fn load_fixture(name: &str) -> String {
    let path = fixture_path(name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to load fixture '{}' from {:?}: {}", name, path, e))
}

pub fn load_course(name: &str) -> CourseSpec {
    CourseSpec::parse(&load_fixture(name))
        .unwrap_or_else(|e| panic!("Fixture '{}' is not a valid course: {}", name, e))
}
