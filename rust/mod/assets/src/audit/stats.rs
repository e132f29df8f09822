use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Duration, Timelike, Utc};

use crate::model::{ActionCount, AuditCategory, AuditLog, AuditQuery, AuditSeverity, AuditStats};

const TOP_ACTIONS: usize = 10;

fn parse_ts(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Aggregate the whole trail as of `now`.
pub fn compute(logs: &[AuditLog], now: DateTime<Utc>) -> AuditStats {
    let mut by_severity: BTreeMap<String, usize> = AuditSeverity::ALL
        .iter()
        .map(|s| (s.label().to_string(), 0))
        .collect();
    let mut by_category: BTreeMap<String, usize> = AuditCategory::ALL
        .iter()
        .map(|c| (c.label().to_string(), 0))
        .collect();
    let mut by_hour = vec![0; 24];
    let mut actions: HashMap<&str, usize> = HashMap::new();
    let mut users = BTreeSet::new();
    let mut last24h = 0;
    let since = now - Duration::hours(24);

    for log in logs {
        *by_severity.entry(log.severity.label().to_string()).or_default() += 1;
        *by_category.entry(log.category.label().to_string()).or_default() += 1;
        *actions.entry(log.action.as_str()).or_default() += 1;
        users.insert(log.user_id.as_str());
        if let Some(ts) = parse_ts(&log.timestamp) {
            by_hour[ts.hour() as usize] += 1;
            if ts > since && ts <= now {
                last24h += 1;
            }
        }
    }

    let mut top_actions: Vec<ActionCount> = actions
        .into_iter()
        .map(|(action, count)| ActionCount {
            action: action.to_string(),
            count,
        })
        .collect();
    top_actions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.action.cmp(&b.action)));
    top_actions.truncate(TOP_ACTIONS);

    AuditStats {
        total: logs.len(),
        by_severity,
        by_category,
        by_hour,
        top_actions,
        unique_users: users.len(),
        last24h,
    }
}

impl AuditQuery {
    pub fn matches(&self, log: &AuditLog) -> bool {
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let q = q.to_lowercase();
            let hit = [
                Some(log.action.as_str()),
                Some(log.user_name.as_str()),
                Some(log.entity_type.as_str()),
                log.entity_id.as_deref(),
                log.description.as_deref(),
            ]
            .into_iter()
            .flatten()
            .any(|field| field.to_lowercase().contains(&q));
            if !hit {
                return false;
            }
        }
        if let Some(t) = self.entity_type.as_deref() {
            if !log.entity_type.eq_ignore_ascii_case(t) {
                return false;
            }
        }
        if self.severity.is_some_and(|s| s != log.severity) {
            return false;
        }
        if self.category.is_some_and(|c| c != log.category) {
            return false;
        }
        if self.user_id.as_deref().is_some_and(|u| u != log.user_id) {
            return false;
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(ts) = parse_ts(&log.timestamp) else {
                return false;
            };
            if self.from.as_deref().and_then(parse_ts).is_some_and(|from| ts < from) {
                return false;
            }
            if self.to.as_deref().and_then(parse_ts).is_some_and(|to| ts > to) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn log(user: &str, action: &str, ts: &str, severity: AuditSeverity) -> AuditLog {
        AuditLog {
            id: format!("{}-{}", user, ts),
            timestamp: ts.into(),
            user_id: user.into(),
            user_name: user.to_uppercase(),
            action: action.into(),
            entity_type: "asset".into(),
            entity_id: Some("A1".into()),
            old_values: None,
            new_values: None,
            severity,
            category: AuditCategory::Update,
            session_id: None,
            description: Some("Moved to Health Office".into()),
        }
    }

    #[test]
    fn stats_over_trail() {
        let now = Utc.with_ymd_and_hms(2024, 6, 2, 12, 0, 0).unwrap();
        let logs = vec![
            log("u1", "update_asset", "2024-06-02T09:15:00Z", AuditSeverity::Medium),
            log("u1", "update_asset", "2024-06-02T09:45:00+00:00", AuditSeverity::Medium),
            log("u2", "delete_asset", "2024-06-01T23:30:00Z", AuditSeverity::High),
            log("u2", "login", "2024-05-20T09:00:00Z", AuditSeverity::Low),
            log("u3", "login", "garbage", AuditSeverity::Low),
        ];
        let stats = compute(&logs, now);
        assert_eq!(stats.total, 5);
        assert_eq!(stats.unique_users, 3);
        assert_eq!(stats.last24h, 3);
        assert_eq!(stats.by_hour[9], 3);
        assert_eq!(stats.by_hour[23], 1);
        assert_eq!(stats.by_hour.iter().sum::<usize>(), 4);
        assert_eq!(stats.by_severity["medium"], 2);
        assert_eq!(stats.by_severity["critical"], 0);
        assert_eq!(stats.by_category["update"], 5);
        assert_eq!(
            stats.top_actions,
            vec![
                ActionCount { action: "login".into(), count: 2 },
                ActionCount { action: "update_asset".into(), count: 2 },
                ActionCount { action: "delete_asset".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn query_filters() {
        let entry = log("u1", "update_asset", "2024-06-02T09:15:00Z", AuditSeverity::Medium);
        let q = |json: &str| serde_json::from_str::<AuditQuery>(json).unwrap();

        assert!(q("{}").matches(&entry));
        assert!(q(r#"{"q":"health"}"#).matches(&entry));
        assert!(q(r#"{"q":"U1"}"#).matches(&entry));
        assert!(!q(r#"{"q":"treasury"}"#).matches(&entry));
        assert!(q(r#"{"severity":"medium","entityType":"Asset"}"#).matches(&entry));
        assert!(!q(r#"{"severity":"high"}"#).matches(&entry));
        assert!(!q(r#"{"userId":"u2"}"#).matches(&entry));
        assert!(q(r#"{"from":"2024-06-02T00:00:00Z","to":"2024-06-02T23:59:59Z"}"#).matches(&entry));
        assert!(!q(r#"{"from":"2024-06-03T00:00:00Z"}"#).matches(&entry));
    }
}
