//! Integration tests for Configuration: loading, queries, mutation and storing

use std::fs;
use std::path::PathBuf;

use rstest::rstest;
use tempfile::TempDir;

use castor::util::testing::init_test_setup;
use castor::{ApplicationError, ConfigPath, Configuration, DomainError, ParseErrorKind};

const AHOI: &str = "\
[ahoi]
    [bhoi]
        [choi]
            bla = yes
        [!choi]
        [choi]
            bla = no
        [!choi]
    [!bhoi]
    [bhoi]
        [choi]
            bla = 1
        [!choi]
        [choi]
            bla = ok
        [!choi]
    [!bhoi]
[!ahoi]
";

fn write_config(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write config file");
    path
}

// ============================================================
// End-to-end queries
// ============================================================

#[test]
fn given_nested_file_when_querying_bools_then_fans_out_across_siblings() {
    init_test_setup();
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "test-configuration.conf", AHOI);

    // Act
    let config = Configuration::open(&path).unwrap();
    let first: bool = config.get(["ahoi", "bhoi.choi", "bla"]).unwrap();
    let all: Vec<bool> = config.get_all(["ahoi", "bhoi.choi", "bla"]).unwrap();

    // Assert
    assert!(first);
    assert_eq!(all, vec![true, false, true, true]);
}

#[test]
fn given_nested_file_when_listing_then_returns_children_of_every_match() {
    init_test_setup();
    let config = Configuration::from_content("ahoi.conf", AHOI).unwrap();

    assert_eq!(config.sections("ahoi").unwrap(), vec!["bhoi", "bhoi"]);
    assert_eq!(
        config.sections(["ahoi", "bhoi"]).unwrap(),
        vec!["choi", "choi", "choi", "choi"]
    );
    assert!(config.names(["ahoi", "bhoi"]).unwrap().is_empty());
}

#[test]
fn given_two_sibling_sections_when_collecting_then_two_leaves_in_order() {
    init_test_setup();
    let config =
        Configuration::from_content("s.conf", "[S]\nK = first\n[!S]\n[S]\nK = second\n[!S]\n")
            .unwrap();

    let found = config.tree().collect(&ConfigPath::from(["S", "K"]));
    let values: Vec<&str> = found
        .iter()
        .map(|&idx| config.tree().get(idx).unwrap().value().unwrap())
        .collect();

    assert_eq!(values, vec!["first", "second"]);
}

#[test]
fn given_missing_path_when_querying_then_not_found_unless_default() {
    init_test_setup();
    let config = Configuration::from_content("ahoi.conf", AHOI).unwrap();

    let err = config.names("missing.path").unwrap_err();
    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::PathNotFound { .. })
    ));
    assert_eq!(config.try_names("default", "missing.path"), vec!["default"]);
    assert!(config
        .get::<String>(["bla", "blubb", "x", "y.z.h.j"])
        .unwrap_err()
        .is_not_found());
}

#[rstest]
#[case("yes", true)]
#[case("TRUE", true)]
#[case("1", true)]
#[case("garbage", true)]
#[case("false", false)]
#[case("No", false)]
#[case("0", false)]
fn given_leaf_when_reading_bool_then_only_denylist_is_false(
    #[case] raw: &str,
    #[case] expected: bool,
) {
    let config = Configuration::from_content("b.conf", &format!("flag = {}\n", raw)).unwrap();
    assert_eq!(config.get::<bool>("flag").unwrap(), expected);
}

#[test]
fn given_bad_number_when_using_try_get_then_conversion_error_still_raised() {
    init_test_setup();
    let config = Configuration::from_content("n.conf", "port = eighty\n").unwrap();

    let err = config.try_get(80u16, "port").unwrap_err();

    match err {
        ApplicationError::Domain(DomainError::Conversion { path, value, .. }) => {
            assert_eq!(path, "port");
            assert_eq!(value, "eighty");
        }
        other => panic!("expected conversion error, got {other:?}"),
    }
}

// ============================================================
// Mutation
// ============================================================

#[test]
fn given_three_matching_leaves_when_setting_then_all_updated_and_none_created() {
    init_test_setup();
    let mut config = Configuration::from_content(
        "m.conf",
        "[s] k = 1 [!s]\n[s] k = 2 [!s]\n[s] k = 3 [!s]\n",
    )
    .unwrap();
    let before = config.tree().len();

    let updated = config.set(9, "s.k");

    assert_eq!(updated, 3);
    assert_eq!(config.tree().len(), before);
    assert_eq!(config.get_all::<i32>("s.k").unwrap(), vec![9, 9, 9]);
    assert_eq!(config.set(1, "s.missing"), 0);
    assert_eq!(config.tree().len(), before);
}

// ============================================================
// Load / store
// ============================================================

#[test]
fn given_modified_config_when_storing_then_reload_sees_change() {
    init_test_setup();
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "app.conf", "# app\n[net]\n  port = 80\n[!net]\n");
    let mut config = Configuration::open(&path).unwrap();

    // Act
    config.set(8080, "net.port");
    config.store().unwrap();
    let reloaded = Configuration::open(&path).unwrap();

    // Assert
    assert_eq!(reloaded.get::<u16>("net.port").unwrap(), 8080);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "# app\n[net]\n    port = 8080\n[!net]\n"
    );
}

#[test]
fn given_config_when_storing_elsewhere_then_original_untouched() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let original = write_config(&temp, "a.conf", "k=v\n");
    let copy = temp.path().join("b.conf");
    let config = Configuration::open(&original).unwrap();

    config.store_to(&copy).unwrap();

    assert_eq!(fs::read_to_string(&original).unwrap(), "k=v\n");
    assert_eq!(fs::read_to_string(&copy).unwrap(), "k = v\n");
}

#[test]
fn given_loaded_config_when_loading_another_file_then_replaces_content() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let first = write_config(&temp, "first.conf", "a = 1\n");
    let second = write_config(&temp, "second.conf", "b = 2\n");
    let mut config = Configuration::open(&first).unwrap();

    config.load(&second).unwrap();

    assert!(config.get::<i32>("a").unwrap_err().is_not_found());
    assert_eq!(config.get::<i32>("b").unwrap(), 2);
    assert_eq!(config.filename(), Some(second.as_path()));
}

#[test]
fn given_missing_file_when_opening_then_io_error_with_path() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nope.conf");

    let err = Configuration::open(&path).unwrap_err();

    assert!(matches!(err, ApplicationError::OperationFailed { .. }));
    assert!(err.to_string().contains("nope.conf"));
}

#[test]
fn given_unclosed_section_when_opening_then_parse_error_names_file() {
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let path = write_config(&temp, "open.conf", "[a]\nkey = 1\n");

    let err = Configuration::open(&path).unwrap_err();

    match err {
        ApplicationError::Parse(parse) => {
            assert_eq!(parse.kind, ParseErrorKind::UnclosedSection { name: "a".into() });
            assert!(parse.filename.ends_with("open.conf"));
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}
