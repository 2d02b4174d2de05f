use chrono::{Datelike, Duration, NaiveDate};

use crate::api::{ApiError, ReflectApi};
use crate::models::{Goal, GoalStatus, Insight, InsightKind, Reflection};
use crate::session::Session;
use crate::state::record_error;
use crate::utils::TimeOfDay;

pub struct Quote {
    pub text: &'static str,
    pub author: &'static str,
}

pub const QUOTES: &[Quote] = &[
    Quote { text: "The only way to do great work is to love what you do.", author: "Steve Jobs" },
    Quote { text: "Success is not final, failure is not fatal: it is the courage to continue that counts.", author: "Winston Churchill" },
    Quote { text: "Believe you can and you're halfway there.", author: "Theodore Roosevelt" },
    Quote { text: "The future belongs to those who believe in the beauty of their dreams.", author: "Eleanor Roosevelt" },
    Quote { text: "It does not matter how slowly you go as long as you do not stop.", author: "Confucius" },
    Quote { text: "Everything you've ever wanted is on the other side of fear.", author: "George Addair" },
    Quote { text: "Don't watch the clock; do what it does. Keep going.", author: "Sam Levenson" },
    Quote { text: "The only impossible journey is the one you never begin.", author: "Tony Robbins" },
    Quote { text: "In the middle of every difficulty lies opportunity.", author: "Albert Einstein" },
    Quote { text: "You are never too old to set another goal or to dream a new dream.", author: "C.S. Lewis" },
    Quote { text: "The secret of getting ahead is getting started.", author: "Mark Twain" },
    Quote { text: "Don't let yesterday take up too much of today.", author: "Will Rogers" },
    Quote { text: "The best time to plant a tree was 20 years ago. The second best time is now.", author: "Chinese Proverb" },
    Quote { text: "Do something today that your future self will thank you for.", author: "Sean Patrick Flanery" },
    Quote { text: "Little things make big days.", author: "Unknown" },
];

/// Same quote for the whole day
pub fn quote_of_the_day(today: NaiveDate) -> &'static Quote {
    &QUOTES[today.ordinal() as usize % QUOTES.len()]
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Insights computed on this side when the server cannot provide them
pub fn local_insights(
    goals: &[Goal],
    yesterday: Option<&Reflection>,
    today: NaiveDate,
    time_of_day: TimeOfDay,
) -> Vec<Insight> {
    let morning = time_of_day == TimeOfDay::Morning;
    let color = |day: &str, night: &str| Some(if morning { day } else { night }.to_string());
    let mut insights = Vec::new();

    let active: Vec<&Goal> = goals.iter().filter(|g| g.status == GoalStatus::Active).collect();
    let urgent: Vec<&&Goal> = active
        .iter()
        .filter(|g| {
            g.deadline
                .is_some_and(|d| (today..=today + Duration::days(7)).contains(&d))
        })
        .collect();

    if let Some(first) = urgent.first() {
        let n = urgent.len();
        insights.push(Insight {
            kind: InsightKind::Goal,
            title: "Focus on Urgent Goals".to_string(),
            message: format!(
                "You have {} goal{} with deadline{} this week. Consider prioritizing: {}",
                n,
                plural(n),
                plural(n),
                first.description
            ),
            color: color("blue", "amber"),
        });
    } else if let Some(first) = active.first() {
        let n = active.len();
        insights.push(Insight {
            kind: InsightKind::Goal,
            title: "Keep Your Goals in Mind".to_string(),
            message: format!(
                "You have {} active goal{}. Today's a great day to make progress on: {}",
                n,
                plural(n),
                first.description
            ),
            color: color("blue", "amber"),
        });
    }

    if let Some(intention) = yesterday.and_then(|r| r.answers()[2]) {
        insights.push(Insight {
            kind: InsightKind::Improvement,
            title: "Yesterday's Intention".to_string(),
            message: format!("You wanted to improve: \"{}\". Let's make today count!", intention),
            color: color("sky", "orange"),
        });
    }

    insights.push(Insight {
        kind: InsightKind::Motivation,
        title: "Start Strong".to_string(),
        message: "Small, consistent actions lead to big results. Focus on making today 1% better than yesterday."
            .to_string(),
        color: color("indigo", "yellow"),
    });

    insights
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsightSource {
    Server,
    Local,
}

/// Morning screen: server insights with a local fallback, plus context for display
#[derive(Debug, Clone, Default)]
pub struct InsightsState {
    pub insights: Vec<Insight>,
    pub source: Option<InsightSource>,
    pub active_goals: Vec<Goal>,
    pub yesterday: Option<Reflection>,
    pub loading: bool,
    pub error: Option<String>,
}

impl InsightsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<A: ReflectApi>(
        &mut self,
        api: &A,
        session: &Session,
        today: NaiveDate,
        time_of_day: TimeOfDay,
    ) -> Result<(), ApiError> {
        self.loading = true;
        let result = self.fetch(api, session, today, time_of_day).await;
        self.loading = false;
        result.map_err(|err| record_error(&mut self.error, err))
    }

    async fn fetch<A: ReflectApi>(
        &mut self,
        api: &A,
        session: &Session,
        today: NaiveDate,
        time_of_day: TimeOfDay,
    ) -> Result<(), ApiError> {
        let remote = api.morning_insights(session).await;
        self.active_goals = api.goals(session, Some(GoalStatus::Active)).await?;

        // A missing or unreadable reflection for yesterday only drops that insight
        let yesterday = today - Duration::days(1);
        self.yesterday = match api.reflection_for_date(session, yesterday).await {
            Ok(reflection) => reflection,
            Err(err) => {
                log::debug!("no reflection for {}: {}", yesterday, err);
                None
            }
        };

        match remote {
            Ok(insights) => {
                self.insights = insights;
                self.source = Some(InsightSource::Server);
            }
            Err(err) => {
                log::warn!("morning insights unavailable, using local insights: {}", err);
                self.insights = local_insights(&self.active_goals, self.yesterday.as_ref(), today, time_of_day);
                self.source = Some(InsightSource::Local);
            }
        }
        self.error = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(id: i64, description: &str, deadline: Option<NaiveDate>) -> Goal {
        Goal {
            id,
            user_id: 1,
            description: description.to_string(),
            status: GoalStatus::Active,
            deadline,
            created_at: None,
        }
    }

    #[test]
    fn urgent_goals_take_priority() {
        let today = date(2026, 3, 4);
        let goals = vec![
            goal(1, "Learn piano", Some(date(2026, 6, 1))),
            goal(2, "File taxes", Some(date(2026, 3, 10))),
        ];
        let insights = local_insights(&goals, None, today, TimeOfDay::Morning);

        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].title, "Focus on Urgent Goals");
        assert!(insights[0].message.contains("1 goal with deadline this week"));
        assert!(insights[0].message.ends_with("File taxes"));
        assert_eq!(insights[1].kind, InsightKind::Motivation);
    }

    #[test]
    fn falls_back_to_first_goal_and_yesterday() {
        let today = date(2026, 3, 4);
        let goals = vec![goal(1, "Learn piano", None), goal(2, "Run a 10k", Some(date(2026, 3, 1)))];
        let yesterday = Reflection {
            id: 9,
            user_id: 1,
            reflection_date: date(2026, 3, 3),
            summary: Some("fine".into()),
            accomplishments: Some("stuff".into()),
            improvements_to_make: Some("Sleep earlier".into()),
            created_at: None,
            updated_at: None,
        };
        let insights = local_insights(&goals, Some(&yesterday), today, TimeOfDay::Evening);

        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Keep Your Goals in Mind", "Yesterday's Intention", "Start Strong"]);
        assert!(insights[0].message.starts_with("You have 2 active goals."));
        assert_eq!(insights[1].color.as_deref(), Some("orange"));
    }

    #[test]
    fn quote_is_stable_for_a_day() {
        let day = date(2026, 3, 4);
        assert_eq!(quote_of_the_day(day).text, quote_of_the_day(day).text);
        assert_eq!(quote_of_the_day(date(2026, 1, 1)).author, QUOTES[1].author);
    }
}
