use std::io::BufRead;

use crate::cursor::LineCursor;
use crate::datetime::DateTime;
use crate::error::DResult;

use super::{read_header, Section, SectionKind};

scalar_fields! {
    /// Run control: direction, period, output timing and physics switches
    pub struct Command {
        /// 1 for forward simulation, -1 for backward simulation
        ldirect: i64 => "    #                LDIRECT:          1 for forward simulation, -1 for backward simulation\n",
        start: DateTime => "    #  YYYYMMDD HHMISS   beginning date of simulation\n",
        // the legacy writer labels the end date as "beginning" too
        stop: DateTime => "    #  YYYYMMDD HHMISS   beginning date of simulation\n",
        /// Seconds between outputs
        output_rate: i64 => "    #             SSSSS  (int)      output every SSSSS seconds\n",
        /// Averaging time of output, in seconds
        average_rate: i64 => "    #             SSSSS  (int)      time average of output (in SSSSS seconds)\n",
        /// Sampling rate of output, in seconds
        sampling_rate: i64 => "    #              SSSSS  (int)      sampling rate of output (in SSSSS seconds)\n",
        splitting_time: i64 => "    #        SSSSS  (int)      time constant for particle splitting (in seconds)\n",
        sync_interval: i64 => "    #              SSSSS  (int)      synchronisation interval of flexpart (in seconds)\n",
        ctl: f64 => "    #              CTL    (real)     factor by which time step must be smaller than tl\n",
        ifine: i64 => "    #               IFINE  (int)      decrease of time step for vertical motion by factor ifine\n",
        iout: i64 => "    #                IOUT              1 concentration, 2 mixing ratio, 3 both, 4 plume traject, 5=1+4\n",
        ipout: i64 => "    #                IPOUT             particle dump: 0 no, 1 every output interval, 2 only at end\n",
        lsubgrid: i64 => "    #                LSUBGRID          subgrid terrain effect parameterization: 1 yes, 0 no\n",
        lconvection: i64 => "    #                LCONVECTION       convection: 3 yes, 0 no\n",
        dt_conv: f64 => "    #            DT_CONV  (real)   time interval to call convection, seconds\n",
        lagespectra: i64 => "    #                LAGESPECTRA       age spectra: 1 yes, 0 no\n",
        ipin: i64 => "    #                IPIN              continue simulation with dumped particle data: 1 yes, 0 no\n",
        iflux: i64 => "    #                IFLUX             calculate fluxes: 1 yes, 0 no\n",
        ioutputforeachrel: i64 => "    #                IOUTPUTFOREACHREL CREATE AN OUPUT FILE FOR EACH RELEASE LOCATION: 1 YES, 0 NO\n",
        mdomainfill: i64 => "    #                MDOMAINFILL       domain-filling trajectory option: 1 yes, 0 no, 2 strat. o3 tracer\n",
        ind_source: i64 => "    #                IND_SOURCE        1=mass unit , 2=mass mixing ratio unit\n",
        ind_receptor: i64 => "    #                IND_RECEPTOR      1=mass unit , 2=mass mixing ratio unit\n",
        /// Whether the nested output grid is used
        nested_output: i64 => "    #                NESTED_OUTPUT     shall nested output be used? 1 yes, 0 no\n",
        linit_cond: i64 => "    #                LINIT_COND   INITIAL COND. FOR BW RUNS: 0=NO,1=MASS UNIT,2=MASS MIXING RATIO UNIT\n",
        turb_option: i64 => "    #                TURB_OPTION       0=no turbulence; 1=diagnosed as in flexpart_ecmwf; 2 and 3=from tke.\n",
        lu_option: i64 => "    #                LU_OPTION         0=old landuse (IGBP.dat); 1=landuse from WRF\n",
        cbl_scheme: i64 => "    #                CBL SCHEME        0=no, 1=yes. works if TURB_OPTION=1\n",
        sfc_option: i64 => "    #                SFC_OPTION        0=default computation of u*, hflux, pblh, 1=from wrf\n",
        wind_option: i64 => "    #                WIND_OPTION       0=snapshot winds, 1=mean winds,2=snapshot eta-dot,-1=w based on divergence\n",
        time_option: i64 => "    #                TIME_OPTION       1=correction of time validity for time-average wind,  0=no need\n",
        outgrid_coord: i64 => "    #                OUTGRID_COORD     0=wrf grid(meters), 1=regular lat/lon grid\n",
        release_coord: i64 => "    #                RELEASE_COORD     0=wrf grid(meters), 1=regular lat/lon grid\n",
        iouttype: i64 => "    #                IOUTTYPE          0=default binary, 1=ascii (for particle dump only),2=netcdf\n",
        /// Time frames per netCDF output file
        nctimerec: i64 => "    #                NCTIMEREC (int)   Time frames per output file, only used for netcdf\n",
        verbose: i64 => "    #                VERBOSE           VERBOSE MODE,0=minimum, 100=maximum\n",
    }
}

impl Command {
    /// `true` for a backward (receptor-oriented) run
    pub fn is_backward(&self) -> bool {
        self.ldirect.value() == Some(&-1)
    }
}

impl Section for Command {
    const KIND: SectionKind = SectionKind::Command;

    fn read_body<B: BufRead>(&mut self, cursor: &mut LineCursor<B>) -> DResult<()> {
        read_header(cursor, Self::KIND)?;
        self.read_fields(cursor)
    }

    fn push_lines(&self, lines: &mut Vec<String>) -> DResult<()> {
        lines.push(Self::KIND.header().to_string());
        self.push_field_lines(lines)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DescriptorError;
    use crate::field::render_template;
    use crate::value::Value;
    use super::*;
    use super::super::test_utils::{cursor, NEXT_HEADER};

    const VALUES: [&str; 35] = [
        "1", "20100801 000000", "20100801 060000", "3600", "3600", "180", "999999999", "180",
        "-5.0", "4", "1", "0", "0", "0", "-1.0", "0", "0", "0", "0", "0", "1", "1", "1", "0",
        "1", "1", "0", "1", "1", "0", "1", "1", "2", "100", "0",
    ];

    fn sample_text() -> String {
        let cmd = Command::default();
        let mut text = SectionKind::Command.header().to_string();
        for (name, value) in Command::FIELD_NAMES.iter().zip(VALUES) {
            let template = cmd.template(name).unwrap();
            text.push_str(&render_template(template, value));
        }
        text
    }

    #[test]
    fn test_field_count() {
        assert_eq!(Command::FIELD_NAMES.len(), 35);
    }

    #[test]
    fn test_read_and_write() -> DResult<()> {
        let text = sample_text();
        let contents = format!("{text}{NEXT_HEADER}");
        let mut c = cursor(&contents);
        let mut cmd = Command::default();
        cmd.read(&mut c)?;

        assert_eq!(cmd.ldirect.value(), Some(&1));
        assert!(!cmd.is_backward());
        assert_eq!(cmd.stop.value().map(|d| d.as_str()), Some("20100801 060000"));
        assert_eq!(cmd.ctl.value(), Some(&-5.0));
        assert_eq!(cmd.get("nctimerec"), Some(Value::Int(100)));
        assert_eq!(cmd.lines()?.concat(), text);
        Ok(())
    }

    #[test]
    fn test_set_by_name() -> DResult<()> {
        let mut cmd = Command::default();
        cmd.set("ldirect", Value::Int(-1))?;
        assert!(cmd.is_backward());

        cmd.set("dt_conv", Value::Int(3600))?;
        assert_eq!(cmd.dt_conv.value(), Some(&3600.0));

        let e = cmd.set("ipout", Value::Float(1.0)).unwrap_err();
        assert!(e.current_context().is_parse());

        let e = cmd.set("no_such_field", Value::Int(1)).unwrap_err();
        assert!(matches!(e.current_context(), DescriptorError::UnknownField(_)));
        Ok(())
    }

    #[test]
    fn test_unset_fields_cannot_be_written() {
        let mut cmd = Command::default();
        cmd.ldirect.set(1);
        let e = cmd.lines().unwrap_err();
        assert!(e.current_context().is_serialization());
    }

    #[test]
    fn test_spurious_line() {
        let text = sample_text();
        let contents = format!("{text}    42\n{NEXT_HEADER}");
        let mut c = cursor(&contents);
        let mut cmd = Command::default();
        let e = cmd.read(&mut c).unwrap_err();
        assert!(e.current_context().is_structural());
        assert_eq!(e.downcast_ref::<SectionKind>(), Some(&SectionKind::Command));
    }
}
