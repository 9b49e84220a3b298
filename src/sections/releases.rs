use std::io::BufRead;

use error_stack::{Report, ResultExt};
use itertools::izip;
use once_cell::sync::Lazy;

use crate::cursor::LineCursor;
use crate::datetime::DateTime;
use crate::error::{DResult, DescriptorError};
use crate::field::{read_value, render_template, Block, ColumnField, Field, Record};
use crate::format_specs::TableLayout;
use crate::ser::{format_real_exp, render_column};
use crate::value::{FieldValue, Value};

use super::{read_header, Section, SectionKind};

const NSPEC_TEMPLATE: &str = "   #                NSPEC           total number of species emitted\n";
const EMITVAR_TEMPLATE: &str = "   #                EMITVAR         1 for emission variation\n";
const LINK_TEMPLATE: &str = "   #                LINK            index of species in file SPECIES\n";
const NUMPOINT_TEMPLATE: &str = "#                 NUMPOINT        number of releases\n";

const START_TEMPLATE: &str = "#   ID1, IT1        beginning date and time of release\n";
const STOP_TEMPLATE: &str = "#   ID1, IT1        ending date and time of release\n";
const X1_TEMPLATE: &str = "#         XPOINT1 (real)  longitude [deg] of lower left corner\n";
const Y1_TEMPLATE: &str = "#         YPOINT1 (real)  latitude [deg] of lower left corner\n";
const X2_TEMPLATE: &str = "#         XPOINT2 (real)  longitude [deg] of upper right corner\n";
const Y2_TEMPLATE: &str = "#         YPOINT2 (real)  latitude [DEG] of upper right corner\n";
const KINDZ_TEMPLATE: &str = "#         KINDZ  (int)  1 for m above ground, 2 for m above sea level, 3 pressure\n";
const Z1_TEMPLATE: &str = "#        ZPOINT1 (real)  lower z-level\n";
const Z2_TEMPLATE: &str = "#        ZPOINT2 (real)  upper z-level \n";
const NPART_TEMPLATE: &str = "#          NPART (int)     total number of particles to be released\n";
const XMASS_TEMPLATE: &str = "#         XMASS (real)    total mass emitted\n";
const NAME_TEMPLATE: &str = "#  NAME OF RELEASE LOCATION\n";

/// Decimals of a mass line, which is written in scientific notation
const MASS_PRECISION: u32 = 4;

static HOURLY_LAYOUT: Lazy<TableLayout> = Lazy::new(|| {
    TableLayout::parse("(3x,i2,f7.3,f7.3)").expect("hourly factor layout is valid")
});

static DAILY_LAYOUT: Lazy<TableLayout> = Lazy::new(|| {
    TableLayout::parse("(3x,i1,1x,f12.3,f12.3)").expect("daily factor layout is valid")
});

/// The period an emission factor table covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CyclePeriod {
    /// 24 rows, one per hour of the day
    Hourly,
    /// 7 rows, one per day of the week
    Daily,
}

impl CyclePeriod {
    pub fn rows(&self) -> usize {
        match self {
            CyclePeriod::Hourly => 24,
            CyclePeriod::Daily => 7,
        }
    }

    fn layout(&self) -> &'static TableLayout {
        match self {
            CyclePeriod::Hourly => &HOURLY_LAYOUT,
            CyclePeriod::Daily => &DAILY_LAYOUT,
        }
    }

    /// Index of the first row of a uniform table: hours count from 0, weekdays from 1
    fn first_index(&self) -> i64 {
        match self {
            CyclePeriod::Hourly => 0,
            CyclePeriod::Daily => 1,
        }
    }
}

/// One row of an emission factor table. `None` is a blank cell.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactorRow {
    /// Hour of the day or day of the week
    pub index: Option<i64>,
    /// Factor for area sources
    pub area: Option<f64>,
    /// Factor for point sources
    pub point: Option<f64>,
}

impl FactorRow {
    pub fn new(index: i64, area: f64, point: f64) -> Self {
        Self { index: Some(index), area: Some(area), point: Some(point) }
    }
}

/// A fixed-length table of emission factors
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FactorTable {
    period: CyclePeriod,
    rows: Vec<FactorRow>,
}

impl FactorTable {
    /// A table with every factor equal to 1
    pub fn uniform(period: CyclePeriod) -> Self {
        let first = period.first_index();
        let rows = (0..period.rows() as i64)
            .map(|i| FactorRow::new(first + i, 1.0, 1.0))
            .collect();
        Self { period, rows }
    }

    pub fn period(&self) -> CyclePeriod {
        self.period
    }

    pub fn rows(&self) -> &[FactorRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&FactorRow> {
        self.rows.get(index)
    }

    /// Replace one row. The number of rows is fixed by the period.
    pub fn set_row(&mut self, index: usize, row: FactorRow) -> DResult<()> {
        let n = self.rows.len();
        let slot = self.rows.get_mut(index).ok_or_else(|| Report::new(DescriptorError::structural(format!(
            "row {index} is out of range for a {n} row factor table"
        ))))?;
        *slot = row;
        Ok(())
    }

    /// Read the table column by column, then step past its rows.
    fn read<B: BufRead>(cursor: &mut LineCursor<B>, period: CyclePeriod) -> DResult<Self> {
        let n = period.rows();
        let columns = period.layout().columns();
        let mut index: ColumnField<i64> = ColumnField::new(columns[0]);
        let mut area: ColumnField<f64> = ColumnField::new(columns[1]);
        let mut point: ColumnField<f64> = ColumnField::new(columns[2]);

        index.read(cursor, n).attach_printable("factor index")?;
        area.read(cursor, n).attach_printable("area factors")?;
        point.read(cursor, n).attach_printable("point factors")?;
        cursor.skip_lines(n)?;

        let rows = izip!(index.values(), area.values(), point.values())
            .map(|(&index, &area, &point)| FactorRow { index, area, point })
            .collect();
        Ok(Self { period, rows })
    }

    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()> {
        if self.rows.len() != self.period.rows() {
            return Err(Report::new(DescriptorError::structural(format!(
                "a {:?} factor table needs {} rows, not {}", self.period, self.period.rows(), self.rows.len()
            ))));
        }

        let layout = self.period.layout();
        let columns = layout.columns();
        for (i, row) in self.rows.iter().enumerate() {
            let cells = [
                render_column(&columns[0].spec, row.index.map(Value::from).as_ref())?,
                render_column(&columns[1].spec, row.area.map(Value::from).as_ref())?,
                render_column(&columns[2].spec, row.point.map(Value::from).as_ref())?,
            ];
            let line = layout.render_row(&cells)
                .map_err(|e| Report::new(DescriptorError::Layout(e)))
                .attach_printable_lazy(|| format!("factor table row {}", i + 1))?;
            lines.push(line + "\n");
        }
        Ok(())
    }
}

/// The hourly and weekday variation of one species' emissions
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmissionCycle {
    pub hourly: FactorTable,
    pub daily: FactorTable,
}

impl EmissionCycle {
    pub fn uniform() -> Self {
        Self { hourly: FactorTable::uniform(CyclePeriod::Hourly), daily: FactorTable::uniform(CyclePeriod::Daily) }
    }
}

/// One emitted species: its row in the species table and, when emission
/// variation is on, its factor tables.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesRelease {
    /// 1-based index into the species table
    pub link: i64,
    pub emission: Option<EmissionCycle>,
}

impl Record for SpeciesRelease {
    /// Whether emission variation is on
    type Context = bool;

    fn read_record<B: BufRead>(cursor: &mut LineCursor<B>, varies: &bool) -> DResult<Self> {
        let link: i64 = read_value(cursor).attach_printable("species link")?;
        let emission = if *varies {
            let hourly = FactorTable::read(cursor, CyclePeriod::Hourly).attach_printable("hourly factors")?;
            let daily = FactorTable::read(cursor, CyclePeriod::Daily).attach_printable("daily factors")?;
            Some(EmissionCycle { hourly, daily })
        } else {
            None
        };
        Ok(Self { link, emission })
    }

    fn push_record_lines(&self, varies: &bool, lines: &mut Vec<String>) -> DResult<()> {
        lines.push(render_template(LINK_TEMPLATE, &self.link.encode()));
        match (&self.emission, *varies) {
            (Some(cycle), true) => {
                cycle.hourly.push_lines(lines).attach_printable("hourly factors")?;
                cycle.daily.push_lines(lines).attach_printable("daily factors")?;
            },
            (None, false) => (),
            (Some(_), false) => {
                return Err(Report::new(DescriptorError::structural(format!(
                    "species {} has emission factors but EMITVAR is not 1", self.link
                ))));
            },
            (None, true) => {
                return Err(Report::new(DescriptorError::serialization(format!(
                    "EMITVAR is 1 but species {} has no emission factors", self.link
                ))));
            },
        }
        Ok(())
    }
}

/// One release location with its timing, extent and per-species masses
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReleasePoint {
    pub start: DateTime,
    pub stop: DateTime,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    /// 1 for meters above ground, 2 for meters above sea level, 3 for pressure
    pub kind_z: i64,
    pub z1: f64,
    pub z2: f64,
    pub particles: i64,
    masses: Vec<f64>,
    pub name: String,
}

impl ReleasePoint {
    /// A release over the box `(x1, y1)`, `(x2, y2)` between `z1` and `z2`,
    /// with one mass per species.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        start: DateTime,
        stop: DateTime,
        (x1, y1): (f64, f64),
        (x2, y2): (f64, f64),
        kind_z: i64,
        (z1, z2): (f64, f64),
        particles: i64,
        masses: Vec<f64>,
        name: String,
    ) -> Self {
        Self { start, stop, x1, y1, x2, y2, kind_z, z1, z2, particles, masses, name }
    }

    /// Mass emitted for each species, in the order of the species links
    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    /// Mutable access to the mass of one species
    pub fn mass_mut(&mut self, species: usize) -> Option<&mut f64> {
        self.masses.get_mut(species)
    }
}

impl Record for ReleasePoint {
    /// The number of species
    type Context = usize;

    fn read_record<B: BufRead>(cursor: &mut LineCursor<B>, nspec: &usize) -> DResult<Self> {
        let start = read_value(cursor).attach_printable("release start")?;
        let stop = read_value(cursor).attach_printable("release stop")?;
        let x1 = read_value(cursor).attach_printable("XPOINT1")?;
        let y1 = read_value(cursor).attach_printable("YPOINT1")?;
        let x2 = read_value(cursor).attach_printable("XPOINT2")?;
        let y2 = read_value(cursor).attach_printable("YPOINT2")?;
        let kind_z = read_value(cursor).attach_printable("KINDZ")?;
        let z1 = read_value(cursor).attach_printable("ZPOINT1")?;
        let z2 = read_value(cursor).attach_printable("ZPOINT2")?;
        let particles = read_value(cursor).attach_printable("NPART")?;

        let mut masses = Vec::with_capacity(*nspec);
        for i in 0..*nspec {
            let m: f64 = read_value(cursor)
                .attach_printable_lazy(|| format!("mass {} of {nspec}", i + 1))?;
            masses.push(m);
        }

        let name = read_value(cursor).attach_printable("release name")?;
        Ok(Self { start, stop, x1, y1, x2, y2, kind_z, z1, z2, particles, masses, name })
    }

    fn push_record_lines(&self, nspec: &usize, lines: &mut Vec<String>) -> DResult<()> {
        if self.masses.len() != *nspec {
            return Err(Report::new(DescriptorError::structural(format!(
                "release '{}' has {} masses for {nspec} species", self.name, self.masses.len()
            ))));
        }

        lines.push(render_template(START_TEMPLATE, &self.start.encode()));
        lines.push(render_template(STOP_TEMPLATE, &self.stop.encode()));
        lines.push(render_template(X1_TEMPLATE, &self.x1.encode()));
        lines.push(render_template(Y1_TEMPLATE, &self.y1.encode()));
        lines.push(render_template(X2_TEMPLATE, &self.x2.encode()));
        lines.push(render_template(Y2_TEMPLATE, &self.y2.encode()));
        lines.push(render_template(KINDZ_TEMPLATE, &self.kind_z.encode()));
        lines.push(render_template(Z1_TEMPLATE, &self.z1.encode()));
        lines.push(render_template(Z2_TEMPLATE, &self.z2.encode()));
        lines.push(render_template(NPART_TEMPLATE, &self.particles.encode()));
        for m in self.masses.iter() {
            lines.push(render_template(XMASS_TEMPLATE, &format_real_exp(*m, MASS_PRECISION)));
        }
        lines.push(render_template(NAME_TEMPLATE, &self.name.token()?));
        Ok(())
    }
}

/// The emitted species and the release points.
///
/// Every release point holds one mass per species. Operations that change
/// the number of species or add a point keep that true and refuse anything
/// that would break it.
#[derive(Debug, Clone, PartialEq)]
pub struct Releases {
    species: Block<SpeciesRelease>,
    /// 1 if the species carry hourly and daily emission factors, 0 if not
    pub emission_variation: Field<i64>,
    points: Block<ReleasePoint>,
}

impl Default for Releases {
    fn default() -> Self {
        Self {
            species: Block::new(NSPEC_TEMPLATE),
            emission_variation: Field::new(EMITVAR_TEMPLATE),
            points: Block::new(NUMPOINT_TEMPLATE),
        }
    }
}

impl Releases {
    pub fn species(&self) -> &[SpeciesRelease] {
        self.species.records()
    }

    pub fn species_mut(&mut self, index: usize) -> Option<&mut SpeciesRelease> {
        self.species.get_mut(index)
    }

    pub fn species_count(&self) -> usize {
        self.species.count()
    }

    pub fn points(&self) -> &[ReleasePoint] {
        self.points.records()
    }

    pub fn point(&self, index: usize) -> Option<&ReleasePoint> {
        self.points.get(index)
    }

    /// Mutable access to one point. Masses can be changed but not added or removed through it.
    pub fn point_mut(&mut self, index: usize) -> Option<&mut ReleasePoint> {
        self.points.get_mut(index)
    }

    pub fn point_count(&self) -> usize {
        self.points.count()
    }

    fn varies(&self) -> bool {
        self.emission_variation.value() == Some(&1)
    }

    fn check_masses(&self, point: &ReleasePoint) -> DResult<()> {
        let nspec = self.species.len();
        if point.masses.len() != nspec {
            return Err(Report::new(DescriptorError::structural(format!(
                "release '{}' has {} masses but {nspec} species are emitted", point.name, point.masses.len()
            ))));
        }
        Ok(())
    }

    /// Append a copy of the release point at `index`.
    pub fn add_copy(&mut self, index: usize) -> DResult<()> {
        self.points.duplicate(index)
    }

    /// Append a release point. It must have one mass per species.
    pub fn push_point(&mut self, point: ReleasePoint) -> DResult<()> {
        self.check_masses(&point)?;
        self.points.push(point);
        Ok(())
    }

    pub fn remove_point(&mut self, index: usize) -> DResult<ReleasePoint> {
        self.points.remove(index)
    }

    /// Replace every mass of one release point.
    pub fn set_masses(&mut self, index: usize, masses: Vec<f64>) -> DResult<()> {
        let nspec = self.species.len();
        if masses.len() != nspec {
            return Err(Report::new(DescriptorError::structural(format!(
                "{} masses given but {nspec} species are emitted", masses.len()
            ))));
        }
        let n = self.points.len();
        let point = self.points.get_mut(index).ok_or_else(|| Report::new(DescriptorError::structural(format!(
            "release index {index} is out of range for {n} releases"
        ))))?;
        point.masses = masses;
        Ok(())
    }

    /// Add a species, giving every release point `mass` of it.
    pub fn push_species(&mut self, species: SpeciesRelease, mass: f64) {
        self.species.push(species);
        for point in self.points.records_mut() {
            point.masses.push(mass);
        }
    }

    /// Remove a species along with its mass in every release point.
    pub fn remove_species(&mut self, index: usize) -> DResult<SpeciesRelease> {
        let species = self.species.remove(index)?;
        for point in self.points.records_mut() {
            point.masses.remove(index);
        }
        Ok(species)
    }
}

impl Section for Releases {
    const KIND: SectionKind = SectionKind::Releases;

    fn read_body<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        read_header(cursor, Self::KIND)?;
        let nspec = self.species.read_count(cursor).attach_printable("NSPEC")?;
        self.emission_variation.read(cursor).attach_printable("EMITVAR")?;
        let varies = self.varies();
        self.species.read_records(cursor, &varies).attach_printable("species links")?;
        self.points.read_count(cursor).attach_printable("NUMPOINT")?;
        self.points.read_records(cursor, &nspec).attach_printable("release points")
    }

    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()> {
        lines.push(Self::KIND.header().to_string());
        lines.push(self.species.specifier_line());
        lines.push(self.emission_variation.line().attach_printable("EMITVAR")?);
        self.species.push_record_lines(&self.varies(), lines)?;
        lines.push(self.points.specifier_line());
        self.points.push_record_lines(&self.species.len(), lines)
    }

    fn expect_end<B: BufRead>(cursor: &mut LineCursor<B>) -> DResult<()> {
        cursor.expect_end_of_input()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::test_utils::cursor;

    fn point_text(name: &str, masses: &[&str]) -> String {
        let mut s = String::new();
        s.push_str(&render_template(START_TEMPLATE, "20100801 000000"));
        s.push_str(&render_template(STOP_TEMPLATE, "20100801 010000"));
        s.push_str(&render_template(X1_TEMPLATE, "-123.0"));
        s.push_str(&render_template(Y1_TEMPLATE, "38.0"));
        s.push_str(&render_template(X2_TEMPLATE, "-122.5"));
        s.push_str(&render_template(Y2_TEMPLATE, "38.5"));
        s.push_str(&render_template(KINDZ_TEMPLATE, "1"));
        s.push_str(&render_template(Z1_TEMPLATE, "0.0"));
        s.push_str(&render_template(Z2_TEMPLATE, "100.0"));
        s.push_str(&render_template(NPART_TEMPLATE, "20000"));
        for m in masses {
            s.push_str(&render_template(XMASS_TEMPLATE, m));
        }
        s.push_str(&render_template(NAME_TEMPLATE, name));
        s
    }

    fn constant_text() -> String {
        format!(
            "{}{}{}{}{}{}{}",
            SectionKind::Releases.header(),
            render_template(NSPEC_TEMPLATE, "2"),
            render_template(EMITVAR_TEMPLATE, "0"),
            render_template(LINK_TEMPLATE, "1"),
            render_template(LINK_TEMPLATE, "2"),
            render_template(NUMPOINT_TEMPLATE, "1"),
            point_text("PLANT", &["5.0000E+03", "1.2500E-02"]),
        )
    }

    fn varying_text() -> String {
        let mut s = String::new();
        s.push_str(SectionKind::Releases.header());
        s.push_str(&render_template(NSPEC_TEMPLATE, "1"));
        s.push_str(&render_template(EMITVAR_TEMPLATE, "1"));
        s.push_str(&render_template(LINK_TEMPLATE, "1"));
        for hour in 0..24 {
            s.push_str(&format!("   {hour:>2}{:>7}{:>7}\n", "1.000", "0.500"));
        }
        for day in 1..=7 {
            s.push_str(&format!("   {day} {:>12}{:>12}\n", "1.100", "0.900"));
        }
        s.push_str(&render_template(NUMPOINT_TEMPLATE, "1"));
        s.push_str(&point_text("CITY", &["1.0000E+00"]));
        s
    }

    #[test]
    fn test_constant_emissions() -> DResult<()> {
        let text = constant_text();
        let mut c = cursor(&text);
        let mut releases = Releases::default();
        releases.read(&mut c)?;

        assert_eq!(releases.species_count(), 2);
        assert_eq!(releases.species()[1], SpeciesRelease { link: 2, emission: None });
        let point = releases.point(0).unwrap();
        assert_eq!(point.masses(), &[5000.0, 0.0125]);
        assert_eq!(point.start.as_str(), "20100801 000000");
        assert_eq!(point.name, "PLANT");
        assert_eq!(releases.lines()?.concat(), text);
        Ok(())
    }

    #[test]
    fn test_varying_emissions() -> DResult<()> {
        let text = varying_text();
        let mut c = cursor(&text);
        let mut releases = Releases::default();
        releases.read(&mut c)?;

        let cycle = releases.species()[0].emission.as_ref().unwrap();
        assert_eq!(cycle.hourly.rows().len(), 24);
        assert_eq!(cycle.hourly.row(23), Some(&FactorRow::new(23, 1.0, 0.5)));
        assert_eq!(cycle.daily.row(0), Some(&FactorRow::new(1, 1.1, 0.9)));
        assert_eq!(releases.lines()?.concat(), text);
        Ok(())
    }

    #[test]
    fn test_add_copy() -> DResult<()> {
        let contents = constant_text();
        let mut c = cursor(&contents);
        let mut releases = Releases::default();
        releases.read(&mut c)?;

        releases.add_copy(0)?;
        releases.point_mut(1).unwrap().name = "PLANT2".to_string();
        assert_eq!(releases.point_count(), 2);

        let lines = releases.lines()?;
        assert_eq!(lines[5], "2                 NUMPOINT        number of releases\n");
        assert_eq!(lines.last().map(String::as_str), Some("PLANT2  NAME OF RELEASE LOCATION\n"));
        assert!(releases.add_copy(5).is_err(), "Copying a missing release did not return an error");

        releases.point_mut(1).unwrap().name = "PLANT 2".to_string();
        let e = releases.lines().unwrap_err();
        assert!(e.current_context().is_serialization(), "A release name with a space was written");
        Ok(())
    }

    #[test]
    fn test_species_changes_follow_masses() -> DResult<()> {
        let contents = constant_text();
        let mut c = cursor(&contents);
        let mut releases = Releases::default();
        releases.read(&mut c)?;

        releases.push_species(SpeciesRelease { link: 3, emission: None }, 0.0);
        assert_eq!(releases.species_count(), 3);
        assert_eq!(releases.point(0).unwrap().masses(), &[5000.0, 0.0125, 0.0]);

        let removed = releases.remove_species(0)?;
        assert_eq!(removed.link, 1);
        assert_eq!(releases.point(0).unwrap().masses(), &[0.0125, 0.0]);

        let e = releases.set_masses(0, vec![1.0]).unwrap_err();
        assert!(e.current_context().is_structural());
        releases.set_masses(0, vec![1.0, 2.0])?;

        let mut point = releases.point(0).unwrap().clone();
        point.masses.pop();
        let e = releases.push_point(point).unwrap_err();
        assert!(e.current_context().is_structural());
        assert_eq!(releases.point_count(), 1);
        Ok(())
    }

    #[test]
    fn test_emission_flag_must_match_tables() -> DResult<()> {
        let contents = constant_text();
        let mut c = cursor(&contents);
        let mut releases = Releases::default();
        releases.read(&mut c)?;

        releases.emission_variation.set(1);
        let e = releases.lines().unwrap_err();
        assert!(e.current_context().is_serialization());

        for i in 0..releases.species_count() {
            releases.species_mut(i).unwrap().emission = Some(EmissionCycle::uniform());
        }
        let lines = releases.lines()?;
        assert_eq!(lines.len(), constant_text().lines().count() + 2 * 31);
        assert_eq!(lines[4], "    0  1.000  1.000\n");

        releases.emission_variation.set(0);
        let e = releases.lines().unwrap_err();
        assert!(e.current_context().is_structural());
        Ok(())
    }

    #[test]
    fn test_trailing_line() {
        let text = format!("{}extra\n", constant_text());
        let mut c = cursor(&text);
        let mut releases = Releases::default();
        let e = releases.read(&mut c).unwrap_err();
        assert!(e.current_context().is_structural());
        assert_eq!(e.downcast_ref::<SectionKind>(), Some(&SectionKind::Releases));
    }

    #[test]
    fn test_missing_mass() {
        let text = constant_text().replace("1.2500E-02         XMASS (real)    total mass emitted\n", "");
        let mut c = cursor(&text);
        let mut releases = Releases::default();
        assert!(releases.read(&mut c).is_err(), "A release with a missing mass was read");
    }
}
