// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Rule commands: `schedule`, `count_down` and `anti_theft`.
//!
//! The three groups share the same shape (list, add, edit, delete, delete
//! all) but differ in their rule payloads. Rule IDs are assigned by the
//! plug and returned from `add_rule`.
//!
//! The firmware has a few irregularities that are kept as-is:
//! - schedule and countdown edits are sent as `add_rule` with an `id`
//! - deleting all schedule rules also erases runtime statistics in the same
//!   envelope
//! - anti-theft add/edit carry a sibling `set_overall_enable` command

use serde_json::{Map, Value, json};

use crate::command::{Command, flag};
use crate::protocol::envelope;

/// How the start or end time of a rule is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeOption {
    /// No time (e.g. a rule without an end).
    None,
    /// A fixed minute of the day.
    #[default]
    Clock,
    /// At sunrise.
    Sunrise,
    /// At sunset.
    Sunset,
}

impl TimeOption {
    /// Returns the numeric value used by the firmware.
    #[must_use]
    pub const fn as_num(self) -> i8 {
        match self {
            Self::None => -1,
            Self::Clock => 0,
            Self::Sunrise => 1,
            Self::Sunset => 2,
        }
    }
}

/// What a rule does to the relay when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuleAction {
    /// Nothing.
    None,
    /// Switch the relay off.
    Off,
    /// Switch the relay on.
    #[default]
    On,
}

impl RuleAction {
    /// Returns the numeric value used by the firmware.
    #[must_use]
    pub const fn as_num(self) -> i8 {
        match self {
            Self::None => -1,
            Self::Off => 0,
            Self::On => 1,
        }
    }
}

/// Days of the week a rule is active on, Sunday first.
///
/// # Examples
///
/// ```
/// use hs100::command::Weekdays;
///
/// let days = Weekdays::new([false, true, true, true, true, true, false]);
/// assert_eq!(days.to_value(), serde_json::json!([0, 1, 1, 1, 1, 1, 0]));
/// assert!(Weekdays::every_day().is_active(6));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Weekdays([bool; 7]);

impl Weekdays {
    /// Creates a weekday set from per-day flags, Sunday first.
    #[must_use]
    pub const fn new(days: [bool; 7]) -> Self {
        Self(days)
    }

    /// All seven days.
    #[must_use]
    pub const fn every_day() -> Self {
        Self([true; 7])
    }

    /// Returns whether the given day (0 = Sunday) is active.
    #[must_use]
    pub fn is_active(&self, day: usize) -> bool {
        self.0.get(day).copied().unwrap_or(false)
    }

    /// Returns the firmware representation: seven 0/1 integers.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Array(self.0.iter().map(|&day| flag(day).into()).collect())
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// A weekly schedule rule.
///
/// # Examples
///
/// ```
/// use hs100::command::{RuleAction, ScheduleRule, TimeOption, Weekdays};
///
/// // On at sunset, off at 23:00, every day.
/// let rule = ScheduleRule::new("evening", Weekdays::every_day())
///     .starting(TimeOption::Sunset, 0, RuleAction::On)
///     .ending(TimeOption::Clock, 23 * 60, RuleAction::Off);
///
/// let data = rule.to_data(None);
/// assert_eq!(data["stime_opt"], 2);
/// assert_eq!(data["emin"], 1380);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRule {
    /// Rule name.
    pub name: String,
    /// Active days.
    pub weekdays: Weekdays,
    /// How the start time is determined.
    pub start_option: TimeOption,
    /// Start minute of the day.
    pub start_minute: u16,
    /// Action at the start time.
    pub start_action: RuleAction,
    /// How the end time is determined.
    pub end_option: TimeOption,
    /// End minute of the day.
    pub end_minute: u16,
    /// Action at the end time.
    pub end_action: RuleAction,
    /// Year of a one-off rule, 0 for repeating rules.
    pub year: u16,
    /// Month of a one-off rule, 0 for repeating rules.
    pub month: u8,
    /// Day of a one-off rule, 0 for repeating rules.
    pub day: u8,
    /// Whether the rule is enabled.
    pub enabled: bool,
    /// Whether the rule repeats weekly.
    pub repeat: bool,
    /// Whether the rule overrides manual switching.
    pub force: bool,
    /// Longitude used for sunrise/sunset.
    pub longitude: f64,
    /// Latitude used for sunrise/sunset.
    pub latitude: f64,
    /// Whether schedules are enabled as a whole.
    pub overall_enable: bool,
}

impl ScheduleRule {
    /// Creates an enabled, repeating rule that switches on at midnight.
    #[must_use]
    pub fn new(name: impl Into<String>, weekdays: Weekdays) -> Self {
        Self {
            name: name.into(),
            weekdays,
            start_option: TimeOption::Clock,
            start_minute: 0,
            start_action: RuleAction::On,
            end_option: TimeOption::None,
            end_minute: 0,
            end_action: RuleAction::None,
            year: 0,
            month: 0,
            day: 0,
            enabled: true,
            repeat: true,
            force: false,
            longitude: 0.0,
            latitude: 0.0,
            overall_enable: true,
        }
    }

    /// Sets the start time and action.
    #[must_use]
    pub fn starting(mut self, option: TimeOption, minute: u16, action: RuleAction) -> Self {
        self.start_option = option;
        self.start_minute = minute;
        self.start_action = action;
        self
    }

    /// Sets the end time and action.
    #[must_use]
    pub fn ending(mut self, option: TimeOption, minute: u16, action: RuleAction) -> Self {
        self.end_option = option;
        self.end_minute = minute;
        self.end_action = action;
        self
    }

    /// Makes this a one-off rule on the given date.
    #[must_use]
    pub fn on_date(mut self, year: u16, month: u8, day: u8) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.repeat = false;
        self
    }

    /// Sets the location used for sunrise/sunset times.
    #[must_use]
    pub fn at_location(mut self, longitude: f64, latitude: f64) -> Self {
        self.longitude = longitude;
        self.latitude = latitude;
        self
    }

    /// Returns the `add_rule` data, with an `id` when editing.
    #[must_use]
    pub fn to_data(&self, id: Option<&str>) -> Value {
        let mut data = json!({
            "name": self.name,
            "wday": self.weekdays.to_value(),
            "stime_opt": self.start_option.as_num(),
            "smin": self.start_minute,
            "sact": self.start_action.as_num(),
            "etime_opt": self.end_option.as_num(),
            "emin": self.end_minute,
            "eact": self.end_action.as_num(),
            "year": self.year,
            "month": self.month,
            "day": self.day,
            "enable": flag(self.enabled),
            "repeat": flag(self.repeat),
            "force": flag(self.force),
            "longitude": self.longitude,
            "latitude": self.latitude,
            "set_overall_enable": { "enable": flag(self.overall_enable) },
        });
        with_id(&mut data, id);
        data
    }
}

/// Commands of the `schedule` group.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleCommand {
    /// Query the next scheduled action.
    GetNextAction,
    /// List the schedule rules.
    GetRules,
    /// Add a rule.
    AddRule(ScheduleRule),
    /// Replace the rule with the given ID.
    EditRule {
        /// Rule ID.
        id: String,
        /// New rule content.
        rule: ScheduleRule,
    },
    /// Delete the rule with the given ID.
    DeleteRule(String),
    /// Delete all rules and erase runtime statistics.
    DeleteAllRules,
}

impl Command for ScheduleCommand {
    fn group(&self) -> &'static str {
        "schedule"
    }

    fn name(&self) -> &'static str {
        match self {
            Self::GetNextAction => "get_next_action",
            Self::GetRules => "get_rules",
            Self::AddRule(_) | Self::EditRule { .. } => "add_rule",
            Self::DeleteRule(_) => "delete_rule",
            Self::DeleteAllRules => "delete_all_rules",
        }
    }

    fn data(&self) -> Option<Value> {
        match self {
            Self::GetNextAction | Self::GetRules | Self::DeleteAllRules => None,
            Self::AddRule(rule) => Some(rule.to_data(None)),
            Self::EditRule { id, rule } => Some(rule.to_data(Some(id))),
            Self::DeleteRule(id) => Some(json!({ "id": id })),
        }
    }

    fn envelope(&self) -> Value {
        match self {
            Self::DeleteAllRules => json!({
                "schedule": { "delete_all_rules": null, "erase_runtime_stat": null }
            }),
            _ => envelope(self.group(), self.name(), self.data()),
        }
    }
}

// ============================================================================
// Countdown
// ============================================================================

/// A countdown rule: perform an action after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownRule {
    /// Rule name.
    pub name: String,
    /// Delay in seconds.
    pub delay: u32,
    /// Whether the rule is enabled.
    pub enabled: bool,
    /// Action when the delay expires.
    pub action: RuleAction,
}

impl CountdownRule {
    /// Creates an enabled rule that switches the relay on after `delay` seconds.
    #[must_use]
    pub fn new(name: impl Into<String>, delay: u32) -> Self {
        Self {
            name: name.into(),
            delay,
            enabled: true,
            action: RuleAction::On,
        }
    }

    /// Sets the action.
    #[must_use]
    pub fn with_action(mut self, action: RuleAction) -> Self {
        self.action = action;
        self
    }

    /// Returns the `add_rule` data, with an `id` when editing.
    #[must_use]
    pub fn to_data(&self, id: Option<&str>) -> Value {
        let mut data = json!({
            "name": self.name,
            "delay": self.delay,
            "enable": flag(self.enabled),
            "act": self.action.as_num(),
        });
        with_id(&mut data, id);
        data
    }
}

/// Commands of the `count_down` group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownCommand {
    /// List the countdown rules.
    GetRules,
    /// Add a rule.
    AddRule(CountdownRule),
    /// Replace the rule with the given ID.
    EditRule {
        /// Rule ID.
        id: String,
        /// New rule content.
        rule: CountdownRule,
    },
    /// Delete the rule with the given ID.
    DeleteRule(String),
    /// Delete all rules.
    DeleteAllRules,
}

impl Command for CountdownCommand {
    fn group(&self) -> &'static str {
        "count_down"
    }

    fn name(&self) -> &'static str {
        match self {
            Self::GetRules => "get_rules",
            Self::AddRule(_) | Self::EditRule { .. } => "add_rule",
            Self::DeleteRule(_) => "delete_rule",
            Self::DeleteAllRules => "delete_all_rules",
        }
    }

    fn data(&self) -> Option<Value> {
        match self {
            Self::GetRules | Self::DeleteAllRules => None,
            Self::AddRule(rule) => Some(rule.to_data(None)),
            Self::EditRule { id, rule } => Some(rule.to_data(Some(id))),
            Self::DeleteRule(id) => Some(json!({ "id": id })),
        }
    }
}

// ============================================================================
// Anti-theft
// ============================================================================

/// An anti-theft rule: switch the relay at random within a time window.
#[derive(Debug, Clone, PartialEq)]
pub struct AntiTheftRule {
    /// Rule name.
    pub name: String,
    /// Active days.
    pub weekdays: Weekdays,
    /// How the window start is determined.
    pub start_option: TimeOption,
    /// Window start minute of the day.
    pub start_minute: u16,
    /// How the window end is determined.
    pub end_option: TimeOption,
    /// Window end minute of the day.
    pub end_minute: u16,
    /// Firmware `duration` value.
    pub duration: u32,
    /// Firmware `lastfor` value.
    pub last_for: u32,
    /// Firmware `frequency` value.
    pub frequency: u32,
    /// Year of a one-off rule, 0 for repeating rules.
    pub year: u16,
    /// Month of a one-off rule, 0 for repeating rules.
    pub month: u8,
    /// Day of a one-off rule, 0 for repeating rules.
    pub day: u8,
    /// Whether the rule is enabled.
    pub enabled: bool,
    /// Whether the rule repeats weekly.
    pub repeat: bool,
    /// Whether the rule overrides manual switching.
    pub force: bool,
    /// Longitude used for sunrise/sunset.
    pub longitude: f64,
    /// Latitude used for sunrise/sunset.
    pub latitude: f64,
    /// Whether anti-theft is enabled as a whole.
    pub overall_enable: bool,
}

impl AntiTheftRule {
    /// Creates an enabled, repeating rule for the given clock window.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        weekdays: Weekdays,
        start_minute: u16,
        end_minute: u16,
    ) -> Self {
        Self {
            name: name.into(),
            weekdays,
            start_option: TimeOption::Clock,
            start_minute,
            end_option: TimeOption::Clock,
            end_minute,
            duration: 2,
            last_for: 1,
            frequency: 5,
            year: 0,
            month: 0,
            day: 0,
            enabled: true,
            repeat: true,
            force: false,
            longitude: 0.0,
            latitude: 0.0,
            overall_enable: true,
        }
    }

    /// Sets the switching pattern within the window.
    #[must_use]
    pub fn with_pattern(mut self, duration: u32, last_for: u32, frequency: u32) -> Self {
        self.duration = duration;
        self.last_for = last_for;
        self.frequency = frequency;
        self
    }

    /// Returns the `add_rule`/`edit_rule` data, with an `id` when editing.
    #[must_use]
    pub fn to_data(&self, id: Option<&str>) -> Value {
        let mut data = json!({
            "name": self.name,
            "wday": self.weekdays.to_value(),
            "stime_opt": self.start_option.as_num(),
            "smin": self.start_minute,
            "etime_opt": self.end_option.as_num(),
            "emin": self.end_minute,
            "duration": self.duration,
            "lastfor": self.last_for,
            "frequency": self.frequency,
            "year": self.year,
            "month": self.month,
            "day": self.day,
            "enable": flag(self.enabled),
            "repeat": flag(self.repeat),
            "force": flag(self.force),
            "longitude": self.longitude,
            "latitude": self.latitude,
        });
        with_id(&mut data, id);
        data
    }
}

/// Commands of the `anti_theft` group.
#[derive(Debug, Clone, PartialEq)]
pub enum AntiTheftCommand {
    /// List the anti-theft rules.
    GetRules,
    /// Add a rule.
    AddRule(AntiTheftRule),
    /// Replace the rule with the given ID.
    EditRule {
        /// Rule ID.
        id: String,
        /// New rule content.
        rule: AntiTheftRule,
    },
    /// Delete the rule with the given ID.
    DeleteRule(String),
    /// Delete all rules.
    DeleteAllRules,
}

impl Command for AntiTheftCommand {
    fn group(&self) -> &'static str {
        "anti_theft"
    }

    fn name(&self) -> &'static str {
        match self {
            Self::GetRules => "get_rules",
            Self::AddRule(_) => "add_rule",
            Self::EditRule { .. } => "edit_rule",
            Self::DeleteRule(_) => "delete_rule",
            Self::DeleteAllRules => "delete_all_rules",
        }
    }

    fn data(&self) -> Option<Value> {
        match self {
            Self::GetRules | Self::DeleteAllRules => None,
            Self::AddRule(rule) => Some(rule.to_data(None)),
            Self::EditRule { id, rule } => Some(rule.to_data(Some(id))),
            Self::DeleteRule(id) => Some(json!({ "id": id })),
        }
    }

    fn envelope(&self) -> Value {
        let overall = match self {
            Self::AddRule(rule) | Self::EditRule { rule, .. } => rule.overall_enable,
            _ => return envelope(self.group(), self.name(), self.data()),
        };

        let mut commands = Map::new();
        commands.insert(self.name().to_string(), self.data().unwrap_or(Value::Null));
        commands.insert("set_overall_enable".to_string(), flag(overall).into());

        let mut root = Map::new();
        root.insert(self.group().to_string(), Value::Object(commands));
        Value::Object(root)
    }
}

fn with_id(data: &mut Value, id: Option<&str>) {
    if let (Some(id), Some(object)) = (id, data.as_object_mut()) {
        object.insert("id".to_string(), id.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_option_values() {
        assert_eq!(TimeOption::None.as_num(), -1);
        assert_eq!(TimeOption::Clock.as_num(), 0);
        assert_eq!(TimeOption::Sunrise.as_num(), 1);
        assert_eq!(TimeOption::Sunset.as_num(), 2);
    }

    #[test]
    fn schedule_rule_payload() {
        let rule = ScheduleRule::new("morning", Weekdays::every_day())
            .starting(TimeOption::Clock, 420, RuleAction::On)
            .ending(TimeOption::Clock, 480, RuleAction::Off);
        let data = rule.to_data(None);

        assert_eq!(data["name"], "morning");
        assert_eq!(data["wday"], json!([1, 1, 1, 1, 1, 1, 1]));
        assert_eq!(data["smin"], 420);
        assert_eq!(data["sact"], 1);
        assert_eq!(data["eact"], 0);
        assert_eq!(data["repeat"], 1);
        assert_eq!(data["set_overall_enable"], json!({"enable": 1}));
        assert!(data.get("id").is_none());
    }

    #[test]
    fn schedule_edit_is_add_rule_with_id() {
        let cmd = ScheduleCommand::EditRule {
            id: "2A3E".into(),
            rule: ScheduleRule::new("x", Weekdays::default()),
        };
        assert_eq!(cmd.name(), "add_rule");
        assert_eq!(cmd.envelope()["schedule"]["add_rule"]["id"], "2A3E");
    }

    #[test]
    fn schedule_one_off_rule() {
        let data = ScheduleRule::new("once", Weekdays::default())
            .on_date(2024, 12, 24)
            .to_data(None);
        assert_eq!(data["year"], 2024);
        assert_eq!(data["day"], 24);
        assert_eq!(data["repeat"], 0);
    }

    #[test]
    fn schedule_delete_all_erases_statistics() {
        assert_eq!(
            ScheduleCommand::DeleteAllRules.envelope(),
            json!({"schedule": {"delete_all_rules": null, "erase_runtime_stat": null}})
        );
    }

    #[test]
    fn countdown_payload() {
        let rule = CountdownRule::new("lamp", 1800).with_action(RuleAction::Off);
        let cmd = CountdownCommand::EditRule {
            id: "7C90".into(),
            rule,
        };
        assert_eq!(
            cmd.envelope(),
            json!({"count_down": {"add_rule": {
                "id": "7C90", "name": "lamp", "delay": 1800, "enable": 1, "act": 0
            }}})
        );
    }

    #[test]
    fn anti_theft_add_has_overall_enable_sibling() {
        let rule = AntiTheftRule::new("away", Weekdays::every_day(), 1140, 1320);
        let env = AntiTheftCommand::AddRule(rule).envelope();

        assert_eq!(env["anti_theft"]["set_overall_enable"], 1);
        assert_eq!(env["anti_theft"]["add_rule"]["lastfor"], 1);
        assert_eq!(env["anti_theft"]["add_rule"]["emin"], 1320);
    }

    #[test]
    fn anti_theft_edit_uses_edit_rule() {
        let mut rule = AntiTheftRule::new("away", Weekdays::every_day(), 0, 60);
        rule.overall_enable = false;
        let cmd = AntiTheftCommand::EditRule {
            id: "E1".into(),
            rule,
        };
        let env = cmd.envelope();
        assert_eq!(cmd.name(), "edit_rule");
        assert_eq!(env["anti_theft"]["edit_rule"]["id"], "E1");
        assert_eq!(env["anti_theft"]["set_overall_enable"], 0);
    }

    #[test]
    fn anti_theft_delete_is_plain_envelope() {
        let env = AntiTheftCommand::DeleteRule("E1".into()).envelope();
        assert_eq!(env, json!({"anti_theft": {"delete_rule": {"id": "E1"}}}));
    }

    #[test]
    fn weekdays_out_of_range_is_inactive() {
        assert!(!Weekdays::every_day().is_active(7));
    }
}
