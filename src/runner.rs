//! Runs registered test cases end to end: load, execute, verify, report.
//!
//! Everything user-visible goes through the `log` facade. The runner is the
//! only place that turns results into progress and summary lines.

use alloc::vec::Vec;

use crate::{
    driver::Conv2dDriver,
    err::Conv2dError,
    osal::{Conv2dPort, Osal},
    reference::{self, OutputWindow},
    registry::{Registry, TestCase},
    task::Dims,
    verify::{self, VerifyReport},
};

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub index: usize,
    pub name: &'static str,
    pub dims: Dims,
    pub verify: VerifyReport,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.verify.passed()
    }

    /// Process status for this run. Mismatches only fail the process when
    /// `strict` is set; otherwise they are reported in the log alone.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if strict && !self.passed() { 1 } else { 0 }
    }
}

/// Process status for a run attempt: non-zero for configuration and device
/// errors, and for mismatches when `strict` is set.
pub fn exit_code_for(result: &Result<RunReport, Conv2dError>, strict: bool) -> i32 {
    match result {
        Ok(report) => report.exit_code(strict),
        Err(_) => 1,
    }
}

pub struct Runner<P: Conv2dPort, O: Osal> {
    driver: Conv2dDriver<P, O>,
    registry: Registry,
}

impl<P: Conv2dPort, O: Osal> Runner<P, O> {
    pub fn new(driver: Conv2dDriver<P, O>, registry: Registry) -> Self {
        Self { driver, registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn driver(&self) -> &Conv2dDriver<P, O> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut Conv2dDriver<P, O> {
        &mut self.driver
    }

    pub fn into_driver(self) -> Conv2dDriver<P, O> {
        self.driver
    }

    /// Runs test case `index`.
    ///
    /// An unknown index or a case that does not fit the device windows fails
    /// before any register is touched.
    pub fn run(&mut self, index: usize) -> Result<RunReport, Conv2dError> {
        let case = match self.registry.get(index) {
            Ok(case) => *case,
            Err(e) => {
                error!(
                    "ERROR: test {} out of range (0..{})",
                    index,
                    self.registry.len().saturating_sub(1)
                );
                return Err(e);
            }
        };
        if let Err(e) = self.driver.check_dims(case.dims) {
            error!("ERROR: test {} ({}) does not fit the device: {}", index, case.dims, e);
            return Err(e);
        }
        self.execute(index, &case)
    }

    /// Runs every registered case in order, stopping at the first error.
    pub fn run_all(&mut self) -> Result<Vec<RunReport>, Conv2dError> {
        (0..self.registry.len()).map(|idx| self.run(idx)).collect()
    }

    fn execute(&mut self, index: usize, case: &TestCase) -> Result<RunReport, Conv2dError> {
        let dims = case.dims;
        info!("[test {}] {} ({})", index, case.name, dims);

        info!("  Loading A...");
        self.driver.load_input(dims, &case.pattern)?;
        self.driver.dump_input(dims);

        info!("  Loading kernel...");
        self.driver.load_kernel(&case.kernel);
        self.driver.dump_kernel();

        info!("  Running Conv2D...");
        self.driver.configure_dimensions(dims);
        self.driver.settle();
        self.driver.start_and_wait()?;

        let expected = reference::compute(dims, &case.pattern, &case.kernel);
        let capacity = self.driver.config().max_reported_mismatches;
        let driver = &mut self.driver;
        let report = verify::compare_bounded(
            dims,
            |idx| driver.read_output(idx),
            expected.as_slice(),
            capacity,
        )?;

        for m in &report.mismatches {
            warn!("    {}", m);
        }
        if report.truncated() > 0 {
            warn!("    ... {} more mismatches not shown", report.truncated());
        }
        if report.passed() {
            info!("  RESULT: {}", report);
        } else {
            error!("  RESULT: {}", report);
        }

        self.dump_result_rows(dims, &expected);

        Ok(RunReport {
            index,
            name: case.name,
            dims,
            verify: report,
        })
    }

    /// Logs the first output rows as read from the device, each followed by
    /// the reference row.
    fn dump_result_rows(&mut self, dims: Dims, expected: &OutputWindow) {
        let rows = self
            .driver
            .config()
            .dump_result_rows
            .min(dims.out_h() as usize);
        let out_w = dims.out_w() as usize;
        info!("  First {} rows of result (HW / SW):", rows);
        for y in 0..rows {
            let hw: Vec<i8> = (0..out_w)
                .map(|x| self.driver.read_output(y * out_w + x))
                .collect();
            info!("    row {}:", y);
            info!("      HW: {:?}", hw);
            info!("      SW: {:?}", expected.row(y));
        }
    }
}
