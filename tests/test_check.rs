use assert_cmd::Command;
use assert_fs::{prelude::FileWriteStr, NamedTempFile};
use predicates::prelude::predicate;

const BOX_P_AND_NOT_P: &str = r#"TYPE Subformula [1.. 5]
TYPE World [1.. 1]
PREDICATE Atom
(3)
(5)
PREDICATE SameAtom
(3, 5)
PREDICATE And
(1, 2, 4)
PREDICATE Not
(4, 5)
PREDICATE Box
(2, 3)
"#;

const MISSING_AND_BLOCK: &str = r#"TYPE Subformula [1.. 3]
TYPE World [1.. 1]
PREDICATE Atom
(2)
(3)
(1, 2, 3)
"#;

fn check_command(files: &[&NamedTempFile]) -> Command {
    let mut cmd = Command::cargo_bin("kripkemin").unwrap();
    cmd.arg("check");
    for f in files {
        cmd.arg("-f").arg(f.path());
    }
    cmd.arg("--logging-level").arg("off");
    cmd
}

#[test]
fn test_check_prints_formula() -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new("box_p_and_not_p.I")?;
    file.write_str(BOX_P_AND_NOT_P)?;
    check_command(&[&file])
        .assert()
        .success()
        .stdout(predicate::eq("(box p1 & ~p1)\n"));
    file.close().unwrap();
    Ok(())
}

#[test]
fn test_check_malformed_instance() -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new("missing_and.I")?;
    file.write_str(MISSING_AND_BLOCK)?;
    check_command(&[&file])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
    file.close().unwrap();
    Ok(())
}

#[test]
fn test_check_continues_after_failure() -> Result<(), Box<dyn std::error::Error>> {
    let bad = NamedTempFile::new("missing_and.I")?;
    bad.write_str(MISSING_AND_BLOCK)?;
    let good = NamedTempFile::new("box_p_and_not_p.I")?;
    good.write_str(BOX_P_AND_NOT_P)?;
    check_command(&[&bad, &good])
        .assert()
        .failure()
        .stdout(predicate::eq("(box p1 & ~p1)\n"));
    bad.close().unwrap();
    good.close().unwrap();
    Ok(())
}

#[test]
fn test_check_missing_file() {
    let mut cmd = Command::cargo_bin("kripkemin").unwrap();
    cmd.arg("check")
        .arg("-f")
        .arg("/nonexistent/instance.I")
        .arg("--logging-level")
        .arg("off");
    cmd.assert().failure();
}
