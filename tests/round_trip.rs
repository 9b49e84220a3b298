use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use flexwrf_input::sections::{MeteoSource, Receptor, Section, SpeciesProperties};
use flexwrf_input::{read_input, DResult, FlexwrfInput, SectionKind, Value};

const FIXTURES: [&str; 4] = ["forward1", "forward2", "backward1", "backward2"];

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(format!("flexwrf.input.{name}"))
}

fn fixture_text(name: &str) -> String {
    std::fs::read_to_string(fixture_path(name)).expect("fixture exists")
}

fn read_str(text: &str) -> DResult<FlexwrfInput> {
    FlexwrfInput::from_reader(BufReader::new(Cursor::new(text.as_bytes())))
}

/// Insert `extra` before line `index` (0-based)
fn insert_line(text: &str, index: usize, extra: &str) -> String {
    let mut lines: Vec<&str> = text.split_inclusive('\n').collect();
    lines.insert(index, extra);
    lines.concat()
}

#[test]
fn test_fixtures_round_trip() -> DResult<()> {
    for name in FIXTURES {
        let text = fixture_text(name);
        let input = read_input(fixture_path(name))?;
        let lines = input.lines()?;
        assert_eq!(lines.len(), text.lines().count(), "Line count changed for {name}");
        assert_eq!(lines.concat(), text, "Round trip of {name} was not byte-identical");
    }
    Ok(())
}

#[test]
fn test_crlf_line_endings() -> DResult<()> {
    for name in FIXTURES {
        let text = fixture_text(name);
        let crlf = read_str(&text.replace('\n', "\r\n"))?;
        assert_eq!(crlf, read_str(&text)?, "Reading {name} with CRLF line endings gave a different document");
        assert_eq!(crlf.lines()?.len(), text.lines().count());
    }
    Ok(())
}

#[test]
fn test_forward1_values() -> DResult<()> {
    let input = read_input(fixture_path("forward1"))?;

    assert_eq!(input.pathnames.output.value(), Some(&PathBuf::from("/scratch2/portfolios/BMC/stela/jbrioude/test_depo1")));
    assert_eq!(input.pathnames.sources.len(), 2);
    assert_eq!(input.command.ldirect.value(), Some(&1));
    assert!(!input.command.is_backward());
    assert_eq!(input.age_classes.classes.values(), &[7200, 999999]);
    assert_eq!(input.output_grid.levels.count(), 3);

    let nest = input.nested_output_grid.geometry.as_ref().expect("forward1 has a nested grid");
    assert_eq!(nest.numxgrid.value(), Some(&24));

    assert!(input.receptors.receptors.is_empty());
    assert_eq!(input.species.count(), 2);
    assert_eq!(input.releases.emission_variation.value(), Some(&0));
    assert_eq!(input.releases.point(0).map(|p| p.masses()[0]), Some(5000.0));
    Ok(())
}

#[test]
fn test_optional_parts() -> DResult<()> {
    let forward2 = read_input(fixture_path("forward2"))?;
    assert!(!forward2.nested_output_grid.is_present());
    assert_eq!(forward2.receptors.receptors.get(1), Some(&Receptor { name: "COAST".to_string(), x: -123.0, y: 38.0 }));
    let cycle = forward2.releases.species()[0].emission.as_ref().expect("forward2 has emission factors");
    assert_eq!(cycle.daily.rows().len(), 7);

    let backward1 = read_input(fixture_path("backward1"))?;
    assert!(backward1.command.is_backward());
    assert!(backward1.nested_output_grid.is_present());
    assert_eq!(backward1.receptors.receptors.count(), 1);

    let backward2 = read_input(fixture_path("backward2"))?;
    assert!(backward2.command.is_backward());
    assert_eq!(backward2.releases.species_count(), 3);
    assert_eq!(backward2.releases.point(1).map(|p| p.masses().to_vec()), Some(vec![1.0, 1.0, 2.5e-5]));
    Ok(())
}

#[test]
fn test_spurious_line_in_each_section() {
    for name in FIXTURES {
        let text = fixture_text(name);
        let headers: Vec<usize> = text.lines()
            .enumerate()
            .filter(|(i, l)| *i > 0 && l.contains("=="))
            .map(|(i, _)| i)
            .collect();

        // before every delimiter after the first line, plus at the very end
        let mut positions = headers;
        positions.push(text.lines().count());
        for pos in positions {
            let bad = insert_line(&text, pos, "    0\n");
            let e = read_str(&bad).unwrap_err();
            assert!(
                e.current_context().is_structural(),
                "An extra line before line {} of {name} gave {:?}", pos + 1, e.current_context()
            );
            assert!(e.downcast_ref::<SectionKind>().is_some(), "The error did not name a section");
        }
    }
}

#[test]
fn test_off_by_one_start() {
    let text = fixture_text("forward1");

    let shifted = insert_line(&text, 0, "\n");
    let e = read_str(&shifted).unwrap_err();
    assert!(e.current_context().is_structural());
    assert_eq!(e.downcast_ref::<SectionKind>(), Some(&SectionKind::Pathnames));

    let truncated: String = text.split_inclusive('\n').skip(1).collect();
    let e = read_str(&truncated).unwrap_err();
    assert!(e.current_context().is_structural());
}

#[test]
fn test_partial_read_keeps_earlier_sections() {
    let text = fixture_text("forward1").replace("    7200             SSSSSS", "    seven             SSSSSS");
    let mut input = FlexwrfInput::new();
    let e = input.read_from(BufReader::new(Cursor::new(text.as_bytes()))).unwrap_err();
    assert!(e.current_context().is_parse());
    assert_eq!(e.downcast_ref::<SectionKind>(), Some(&SectionKind::AgeClasses));
    assert_eq!(input.command.ldirect.value(), Some(&1));
    assert!(input.releases.points().is_empty());
}

#[test]
fn test_edit_and_write() -> DResult<()> {
    let mut input = read_input(fixture_path("forward1"))?;
    let original_lines = input.lines()?.len();

    input.age_classes.classes.push(86400);
    input.releases.add_copy(1)?;
    input.pathnames.sources.push(MeteoSource::new("/scratch2/wrf_d03/", "/scratch2/wrf_d03/AVAILABLE"));
    input.species.push(SpeciesProperties { name: Some("SO2".to_string()), molecular_weight: Some(64.0), ..Default::default() });
    input.command.set("verbose", Value::Int(100))?;
    input.command.start.set_datetime("20100801 120000")?;

    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("flexwrf.input");
    input.write(&path)?;

    let reread = read_input(&path)?;
    // one age class, one release of 13 lines for two species, two paths, one species row
    assert_eq!(reread.lines()?.len(), original_lines + 1 + 13 + 2 + 1);
    assert_eq!(reread.age_classes.classes.count(), 3);
    assert_eq!(reread.releases.point_count(), 3);
    assert_eq!(reread.releases.point(2).map(|p| p.name.as_str()), Some("SANJOSE"));
    assert_eq!(reread.species.name.get(2).map(String::as_str), Some("SO2"));
    assert_eq!(reread.species.wet_scavenging_a.get(2), None);
    assert_eq!(reread.command.get("verbose"), Some(Value::Int(100)));
    assert_eq!(reread.command.start.value().map(|d| d.as_str()), Some("20100801 120000"));
    assert_eq!(reread, input);
    Ok(())
}

#[test]
fn test_write_to_matches_render() -> DResult<()> {
    let input = read_input(fixture_path("backward2"))?;
    let mut buf = vec![];
    input.write_to(&mut buf)?;
    assert_eq!(String::from_utf8(buf).expect("output is UTF-8"), input.render()?);
    assert_eq!(input.releases.lines()?[0], SectionKind::Releases.header());
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn test_records_serialize() -> DResult<()> {
    let input = read_input(fixture_path("forward2"))?;
    let json = serde_json::to_value(input.receptors.receptors.records()).expect("receptors serialize");
    assert_eq!(json[0]["name"], "TOWER");

    let point = serde_json::to_value(input.releases.point(0)).expect("release point serializes");
    assert_eq!(point["start"], "20100801 000000");
    assert_eq!(point["masses"][0], 5000.0);
    Ok(())
}
