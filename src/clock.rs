//! Wall-clock access
//!
//! Everything downstream works on naive local time; the host's timezone is
//! whatever `chrono::Local` resolves to.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};

use crate::models::{TimeContext, TimePeriod};

pub trait Clock {
  fn now(&self) -> NaiveDateTime;

  fn today(&self) -> NaiveDate {
    self.now().date()
  }

  fn time_context(&self) -> TimeContext {
    let now = self.now();
    let period = TimePeriod::from_hour(now.hour());
    TimeContext {
      period,
      hour: now.hour(),
      date: now.date(),
      suggested_intensity: period.suggested_intensity(),
    }
  }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> NaiveDateTime {
    Local::now().naive_local()
  }
}

/// Pinned time, for tests and replays
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
  pub fn at(date: NaiveDate, hour: u32) -> Option<Self> {
    date.and_hms_opt(hour, 0, 0).map(Self)
  }
}

impl Clock for FixedClock {
  fn now(&self) -> NaiveDateTime {
    self.0
  }
}
