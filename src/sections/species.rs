use std::io::BufRead;

use error_stack::{Report, ResultExt};
use once_cell::sync::Lazy;

use crate::cursor::LineCursor;
use crate::error::{DResult, DescriptorError};
use crate::field::{ColumnField, Specifier};
use crate::format_specs::TableLayout;

use super::{read_header, Section, SectionKind};

const COUNT_TEMPLATE: &str = "    #               NUMTABLE        number of variable properties. The following lines are fixed format\n";
const LEGEND: &str = "XXXX|NAME    |decaytime |wetscava  |wetsb|drydif|dryhenry|drya|partrho  |parmean|partsig|dryvelo|weight |\n";
const ROW_LAYOUT: &str = "(4x,a10,f10.1,e11.1,f6.2,f7.1,e9.1,f5.1,e10.1,e8.1,e8.1,f8.2,f8.2)";

static LAYOUT: Lazy<TableLayout> = Lazy::new(|| {
    TableLayout::parse(ROW_LAYOUT).expect("species row layout is valid")
});

/// One row of the species table. `None` is a blank cell.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesProperties {
    pub name: Option<String>,
    /// Half life in seconds; negative for no decay
    pub decay_time: Option<f64>,
    pub wet_scavenging_a: Option<f64>,
    pub wet_scavenging_b: Option<f64>,
    pub dry_diffusivity: Option<f64>,
    pub dry_henry: Option<f64>,
    pub dry_reactivity: Option<f64>,
    pub particle_density: Option<f64>,
    pub particle_mean_diameter: Option<f64>,
    pub particle_sigma: Option<f64>,
    pub dry_velocity: Option<f64>,
    pub molecular_weight: Option<f64>,
}

/// The fixed-column species table.
///
/// Each column can be edited cell by cell; rows are added and removed with
/// [`Species::push`] and [`Species::remove`] so the columns stay the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    count: Specifier,
    pub name: ColumnField<String>,
    pub decay_time: ColumnField<f64>,
    pub wet_scavenging_a: ColumnField<f64>,
    pub wet_scavenging_b: ColumnField<f64>,
    pub dry_diffusivity: ColumnField<f64>,
    pub dry_henry: ColumnField<f64>,
    pub dry_reactivity: ColumnField<f64>,
    pub particle_density: ColumnField<f64>,
    pub particle_mean_diameter: ColumnField<f64>,
    pub particle_sigma: ColumnField<f64>,
    pub dry_velocity: ColumnField<f64>,
    pub molecular_weight: ColumnField<f64>,
}

impl Default for Species {
    fn default() -> Self {
        let c = LAYOUT.columns();
        Self {
            count: Specifier::new(COUNT_TEMPLATE),
            name: ColumnField::new(c[0]),
            decay_time: ColumnField::new(c[1]),
            wet_scavenging_a: ColumnField::new(c[2]),
            wet_scavenging_b: ColumnField::new(c[3]),
            dry_diffusivity: ColumnField::new(c[4]),
            dry_henry: ColumnField::new(c[5]),
            dry_reactivity: ColumnField::new(c[6]),
            particle_density: ColumnField::new(c[7]),
            particle_mean_diameter: ColumnField::new(c[8]),
            particle_sigma: ColumnField::new(c[9]),
            dry_velocity: ColumnField::new(c[10]),
            molecular_weight: ColumnField::new(c[11]),
        }
    }
}

impl Species {
    /// Number of rows in the table
    pub fn count(&self) -> usize {
        self.count.count()
    }

    pub fn len(&self) -> usize {
        self.name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    fn real_columns(&self) -> [&ColumnField<f64>; 11] {
        [
            &self.decay_time, &self.wet_scavenging_a, &self.wet_scavenging_b, &self.dry_diffusivity,
            &self.dry_henry, &self.dry_reactivity, &self.particle_density, &self.particle_mean_diameter,
            &self.particle_sigma, &self.dry_velocity, &self.molecular_weight,
        ]
    }

    fn real_columns_mut(&mut self) -> [&mut ColumnField<f64>; 11] {
        [
            &mut self.decay_time, &mut self.wet_scavenging_a, &mut self.wet_scavenging_b, &mut self.dry_diffusivity,
            &mut self.dry_henry, &mut self.dry_reactivity, &mut self.particle_density, &mut self.particle_mean_diameter,
            &mut self.particle_sigma, &mut self.dry_velocity, &mut self.molecular_weight,
        ]
    }

    /// Copy out one row
    pub fn row(&self, index: usize) -> Option<SpeciesProperties> {
        if index >= self.len() {
            return None;
        }

        let [decay_time, wet_scavenging_a, wet_scavenging_b, dry_diffusivity, dry_henry, dry_reactivity,
             particle_density, particle_mean_diameter, particle_sigma, dry_velocity, molecular_weight]
            = self.real_columns().map(|c| c.get(index).copied());

        Some(SpeciesProperties {
            name: self.name.get(index).cloned(),
            decay_time,
            wet_scavenging_a,
            wet_scavenging_b,
            dry_diffusivity,
            dry_henry,
            dry_reactivity,
            particle_density,
            particle_mean_diameter,
            particle_sigma,
            dry_velocity,
            molecular_weight,
        })
    }

    /// Append a row.
    pub fn push(&mut self, props: SpeciesProperties) {
        self.name.push(props.name);
        let values = [
            props.decay_time, props.wet_scavenging_a, props.wet_scavenging_b, props.dry_diffusivity,
            props.dry_henry, props.dry_reactivity, props.particle_density, props.particle_mean_diameter,
            props.particle_sigma, props.dry_velocity, props.molecular_weight,
        ];
        for (column, value) in self.real_columns_mut().into_iter().zip(values) {
            column.push(value);
        }
        self.resync();
    }

    /// Remove a row and return it.
    pub fn remove(&mut self, index: usize) -> DResult<SpeciesProperties> {
        let row = self.row(index).ok_or_else(|| Report::new(DescriptorError::structural(format!(
            "species index {index} is out of range for a table of {} rows", self.len()
        ))))?;
        self.name.remove(index);
        for column in self.real_columns_mut() {
            column.remove(index);
        }
        self.resync();
        Ok(row)
    }

    fn resync(&mut self) {
        self.count.sync(self.name.len());
        debug_assert!(self.real_columns().iter().all(|c| c.len() == self.count.count()));
    }
}

impl Section for Species {
    const KIND: SectionKind = SectionKind::Species;

    fn read_body<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        read_header(cursor, Self::KIND)?;
        let rows = self.count.read(cursor).attach_printable("species count")?;
        // legend
        cursor.skip_lines(1)?;

        self.name.read(cursor, rows).attach_printable("species name")?;
        for column in self.real_columns_mut() {
            let (start, end) = (column.column().start, column.column().end);
            column.read(cursor, rows)
                .attach_printable_lazy(|| format!("species table columns {start}..{end}"))?;
        }
        cursor.skip_lines(rows)?;
        self.resync();
        Ok(())
    }

    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()> {
        lines.push(Self::KIND.header().to_string());
        lines.push(self.count.line());
        lines.push(LEGEND.to_string());

        let mut columns = vec![self.name.as_strings()?];
        for column in self.real_columns() {
            columns.push(column.as_strings()?);
        }

        let rows = self.count();
        if columns.iter().any(|c| c.len() != rows) {
            return Err(Report::new(DescriptorError::structural(format!(
                "species columns do not all have {rows} rows"
            ))));
        }

        for i in 0..rows {
            let cells: Vec<&str> = columns.iter().map(|c| c[i].as_str()).collect();
            let row = LAYOUT.render_row(&cells)
                .map_err(|e| Report::new(DescriptorError::Layout(e)))
                .attach_printable_lazy(|| format!("species row {}", i + 1))?;
            lines.push(row + "\n");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::test_utils::{cursor, NEXT_HEADER};

    const ROWS: &str = "    AIRTRACER     -999.9   -9.9E-09         -9.9 -9.9E-09 -9.9  -9.9E+09-9.9E-09-9.9E-09   -9.99   29.00\n    CO            -999.9    1.0E-04  0.80   -9.9 -9.9E-09 -9.9  -9.9E+09-9.9E-09-9.9E-09   -9.99   28.00\n";

    fn sample() -> String {
        format!(
            "{}    2               NUMTABLE        number of variable properties. The following lines are fixed format\n{LEGEND}{ROWS}",
            SectionKind::Species.header()
        )
    }

    #[test]
    fn test_read_and_write() -> DResult<()> {
        let text = sample();
        let contents = format!("{text}{NEXT_HEADER}");
        let mut c = cursor(&contents);
        let mut species = Species::default();
        species.read(&mut c)?;

        assert_eq!(species.count(), 2);
        assert_eq!(species.name.values(), &[Some("AIRTRACER".to_string()), Some("CO".to_string())]);
        assert_eq!(species.wet_scavenging_a.get(1), Some(&1e-4));
        assert_eq!(species.molecular_weight.get(0), Some(&29.0));
        assert_eq!(species.lines()?.concat(), text);
        Ok(())
    }

    #[test]
    fn test_blank_cell() -> DResult<()> {
        let contents = format!("{}{NEXT_HEADER}", sample());
        let mut c = cursor(&contents);
        let mut species = Species::default();
        species.read(&mut c)?;

        assert_eq!(species.wet_scavenging_b.values(), &[None, Some(0.8)]);
        assert_eq!(species.wet_scavenging_b.as_strings()?, vec!["      ".to_string(), "  0.80".to_string()]);
        Ok(())
    }

    #[test]
    fn test_push_and_remove() -> DResult<()> {
        let contents = format!("{}{NEXT_HEADER}", sample());
        let mut c = cursor(&contents);
        let mut species = Species::default();
        species.read(&mut c)?;

        let mut so2 = species.row(1).unwrap();
        so2.name = Some("SO2".to_string());
        so2.molecular_weight = Some(64.0);
        species.push(so2.clone());
        assert_eq!(species.count(), 3);
        assert_eq!(species.row(2), Some(so2));

        let removed = species.remove(0)?;
        assert_eq!(removed.name.as_deref(), Some("AIRTRACER"));
        assert_eq!(species.count(), 2);

        let lines = species.lines()?;
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "    2               NUMTABLE        number of variable properties. The following lines are fixed format\n");
        assert!(lines[4].starts_with("    SO2       "));
        assert!(species.remove(5).is_err(), "Out of range removal did not return an error");
        Ok(())
    }

    #[test]
    fn test_name_too_long() {
        let mut species = Species::default();
        species.push(SpeciesProperties { name: Some("A_VERY_LONG_NAME".to_string()), ..Default::default() });
        let e = species.lines().unwrap_err();
        assert!(e.current_context().is_serialization());
    }

    #[test]
    fn test_count_too_high() {
        let text = sample().replace("    2               NUMTABLE", "    3               NUMTABLE");
        let contents = format!("{text}{NEXT_HEADER}");
        let mut c = cursor(&contents);
        let mut species = Species::default();
        let e = species.read(&mut c).unwrap_err();
        assert!(e.current_context().is_structural());
    }
}
