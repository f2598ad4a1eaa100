//! Simulated analytics over recorded page views.
//!
//! Nothing here observes real sessions. "Online users" are a random sample
//! of recent page views restamped with the current time, the same demo data
//! the admin dashboard has always shown. Swap [`OnlineUsersTracker`] for a
//! heartbeat-driven source when real presence data exists.

use std::collections::HashMap;

use chrono::{DateTime, Duration, NaiveDate, TimeDelta, Utc};
use rand::Rng;
use serde::Serialize;

use crate::config::AnalyticsConfig;
use crate::content_model::PageView;
use crate::device::Device;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUser {
    pub id: String,
    pub path: String,
    pub device: Device,
    /// Fabricated; no address is captured anywhere.
    pub ip: String,
    pub last_seen: DateTime<Utc>,
}

pub struct OnlineUsersTracker {
    refresh_interval: Duration,
    inclusion_probability: f64,
    sample_window: usize,
    last_refresh: Option<DateTime<Utc>>,
    users: Vec<OnlineUser>,
}

impl OnlineUsersTracker {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            refresh_interval: refresh_interval(config.refresh_interval_secs),
            inclusion_probability: config.inclusion_probability.clamp(0.0, 1.0),
            sample_window: config.sample_window,
            last_refresh: None,
            users: Vec::new(),
        }
    }

    pub fn users(&self) -> &[OnlineUser] {
        &self.users
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.last_refresh
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_refresh {
            Some(last) => now - last >= self.refresh_interval,
            None => true,
        }
    }

    /// Refreshes only when the interval has elapsed. Returns whether it did.
    pub fn refresh_if_due<R: Rng>(
        &mut self,
        views: &[PageView],
        banned_ips: &[String],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.refresh(views, banned_ips, now, rng);
        true
    }

    /// Resamples the most recent views. Users whose fabricated IP is banned
    /// are dropped after sampling.
    pub fn refresh<R: Rng>(
        &mut self,
        views: &[PageView],
        banned_ips: &[String],
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> &[OnlineUser] {
        let mut sampled = Vec::new();
        for view in views.iter().take(self.sample_window) {
            let included = rng.gen_bool(self.inclusion_probability);
            let ip = format!("192.168.{}.{}", rng.gen_range(0..=255), rng.gen_range(1..=254));
            if included {
                sampled.push(OnlineUser {
                    id: view.id.clone(),
                    path: view.path.clone(),
                    device: view.device,
                    ip,
                    last_seen: now,
                });
            }
        }

        let before = sampled.len();
        sampled.retain(|user| !banned_ips.iter().any(|banned| banned == &user.ip));
        log::debug!(
            "ONLINE_USERS_REFRESHED candidates={} sampled={} banned_filtered={}",
            views.len().min(self.sample_window),
            sampled.len(),
            before - sampled.len()
        );

        self.users = sampled;
        self.last_refresh = Some(now);
        &self.users
    }
}

/// Out-of-range intervals saturate instead of panicking.
fn refresh_interval(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyViews {
    pub date: NaiveDate,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeviceBreakdown {
    pub mobile: usize,
    pub tablet: usize,
    pub desktop: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCount {
    pub path: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSummary {
    pub total_views: usize,
    /// Oldest day first, zero-filled.
    pub views_by_day: Vec<DailyViews>,
    pub devices: DeviceBreakdown,
    /// Most viewed first; ties broken by path.
    pub top_pages: Vec<PageCount>,
}

pub const TOP_PAGES_LIMIT: usize = 5;

/// Aggregates page views for the dashboard charts.
///
/// `views_by_day` covers the `days` days ending at `today`; totals, devices
/// and top pages cover every view passed in.
pub fn summarize_traffic(views: &[PageView], days: u32, today: NaiveDate) -> TrafficSummary {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    let mut per_path: HashMap<&str, usize> = HashMap::new();
    let mut devices = DeviceBreakdown::default();

    for view in views {
        *per_day.entry(view.date).or_default() += 1;
        *per_path.entry(view.path.as_str()).or_default() += 1;
        match view.device {
            Device::Mobile => devices.mobile += 1,
            Device::Tablet => devices.tablet += 1,
            Device::Desktop => devices.desktop += 1,
        }
    }

    let views_by_day = (0..days)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset as i64);
            DailyViews {
                date,
                count: per_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect();

    let mut top_pages: Vec<PageCount> = per_path
        .into_iter()
        .map(|(path, count)| PageCount {
            path: path.to_string(),
            count,
        })
        .collect();
    top_pages.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
    top_pages.truncate(TOP_PAGES_LIMIT);

    TrafficSummary {
        total_views: views.len(),
        views_by_day,
        devices,
        top_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_huge_refresh_interval_saturates() {
        let tracker = OnlineUsersTracker::new(&AnalyticsConfig {
            refresh_interval_secs: u64::MAX,
            ..AnalyticsConfig::default()
        });
        assert_eq!(tracker.refresh_interval, TimeDelta::MAX);

        let edge = OnlineUsersTracker::new(&AnalyticsConfig {
            refresh_interval_secs: i64::MAX as u64,
            ..AnalyticsConfig::default()
        });
        assert_eq!(edge.refresh_interval, TimeDelta::MAX);
    }

    #[test]
    fn test_refresh_interval_from_config() {
        let tracker = OnlineUsersTracker::new(&AnalyticsConfig::default());
        assert_eq!(tracker.refresh_interval, Duration::seconds(30));
    }
}
