use std::io::Write;

use anyhow::Result;
use flightq_factdb::{FactDbError, FactStore};

#[test]
fn load_reads_facts_and_canonicalizes_cities() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(file, "(ATIME VJ1 HUE 13:30HR)")?;
    writeln!(file, "(DTIME VN4 HN 6:00HR)")?;
    writeln!(file, "(RUN-TIME VN1 Huế HCM 1:30HR)")?;
    writeln!(file, "(RUN-TIME VN1 HUE)")?;
    writeln!(file, "garbage")?;

    let store = FactStore::load(file.path())?;
    assert_eq!(store.len(), 3);
    let route = store.routes().iter().next().expect("one route");
    assert_eq!((route.source.as_str(), route.dest.as_str()), ("HUE", "HCM"));
    assert_eq!(
        store.known_planes().into_iter().collect::<Vec<_>>(),
        vec!["VJ1", "VN1", "VN4"]
    );
    Ok(())
}

#[test]
fn missing_fact_file_is_fatal() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let err = FactStore::load(&dir.path().join("facts.txt")).unwrap_err();
    assert!(matches!(err, FactDbError::NotFound { .. }));
    assert!(err.to_string().contains("facts.txt"));
    Ok(())
}

#[test]
fn duplicate_facts_collapse() {
    let store = FactStore::parse("(ATIME VJ1 HUE 13:30HR)\n(ATIME VJ1 HUE 13:30HR)\n");
    assert_eq!(store.arrivals().len(), 1);
}
