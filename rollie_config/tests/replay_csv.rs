use std::fs::File;
use std::io::Write;

use rollie_config::{ReplayRow, load_replay_csv};
use rstest::rstest;
use tempfile::tempdir;

fn write_csv(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("replay.csv");
    let mut f = File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    (dir, path)
}

#[rstest]
fn loads_rows_with_and_without_tags() {
    let (_dir, path) = write_csv("weight_g,tag_g\n0.0,\n81200.5,12000\n81180.0,\n");
    let rows = load_replay_csv(&path).unwrap();
    assert_eq!(
        rows,
        vec![
            ReplayRow {
                weight_g: 0.0,
                tag_g: None
            },
            ReplayRow {
                weight_g: 81200.5,
                tag_g: Some(12000.0)
            },
            ReplayRow {
                weight_g: 81180.0,
                tag_g: None
            },
        ]
    );
}

#[rstest]
#[case("grams,tag\n1.0,\n")]
#[case("tag_g,weight_g\n1.0,\n")]
#[case("weight_g\n1.0\n")]
fn rejects_unexpected_headers(#[case] contents: &str) {
    let (_dir, path) = write_csv(contents);
    let err = load_replay_csv(&path).expect_err("headers should be rejected");
    assert!(format!("{err}").contains("must have headers 'weight_g,tag_g'"));
}

#[rstest]
fn rejects_unparsable_row_with_line_number() {
    let (_dir, path) = write_csv("weight_g,tag_g\n1.0,\nheavy,\n");
    let err = load_replay_csv(&path).expect_err("bad row");
    assert!(format!("{err}").contains("invalid CSV row 3"));
}

#[rstest]
fn rejects_non_finite_weight() {
    let (_dir, path) = write_csv("weight_g,tag_g\nNaN,\n");
    let err = load_replay_csv(&path).expect_err("NaN row");
    assert!(format!("{err}").contains("weight_g must be finite"));
}

#[rstest]
fn rejects_empty_file_and_missing_path() {
    let (_dir, path) = write_csv("weight_g,tag_g\n");
    assert!(load_replay_csv(&path).is_err());
    let missing = std::path::Path::new("/definitely/not/here.csv");
    let err = load_replay_csv(missing).expect_err("missing file");
    assert!(format!("{err}").contains("open replay CSV"));
}
