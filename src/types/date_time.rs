//! Julian date and elapsed-time values from the header variables

/// A Julian day number plus milliseconds into that day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DwgDateTime {
    pub julian_day: i32,
    pub milliseconds: i32,
}

impl DwgDateTime {
    pub const fn new(julian_day: i32, milliseconds: i32) -> Self {
        Self {
            julian_day,
            milliseconds,
        }
    }

    /// Fractional Julian date.
    pub fn as_julian(&self) -> f64 {
        self.julian_day as f64 + self.milliseconds as f64 / 86_400_000.0
    }
}

/// An elapsed time stored as whole days plus milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DwgTimeSpan {
    pub days: i32,
    pub milliseconds: i32,
}

impl DwgTimeSpan {
    pub const fn new(days: i32, milliseconds: i32) -> Self {
        Self { days, milliseconds }
    }

    pub fn total_seconds(&self) -> f64 {
        self.days as f64 * 86_400.0 + self.milliseconds as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractional_values() {
        let d = DwgDateTime::new(2_451_545, 43_200_000);
        assert_eq!(d.as_julian(), 2_451_545.5);
        let t = DwgTimeSpan::new(1, 1500);
        assert_eq!(t.total_seconds(), 86_401.5);
    }
}
