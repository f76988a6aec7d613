// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Content generation orchestration.
//!
//! Drives the daily dashboard run and the discussion-prompt run: gather
//! context, extract themes, band community engagement, call the text
//! generator, and store the result as an unapproved draft. Generator calls
//! are sequential and never retried; any step failing aborts the run with
//! nothing written, so a draft row always holds real generated content.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use cohort_config::model::GenerationConfig;
use cohort_core::{
    CohortError, CommunityContext, ContentType, EngagementLevel, EventSummary, GenerationRequest,
    PracticeAction, ProgramState, TextGenerator, WeeklyMetrics,
};
use cohort_storage::models::DashboardContentRow;
use cohort_storage::queries::{content, discussions, members, snapshots};
use cohort_storage::Database;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::context;
use crate::themes;

/// One entry in the generated activity feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFeedItem {
    pub title: String,
    pub author: String,
    pub highlight: String,
}

/// Community-wide numbers shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityStats {
    pub active_users: u64,
    pub total_users: u64,
    pub engagement_level: EngagementLevel,
}

/// The full dashboard body stored in a content row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardBody {
    pub hero_message: String,
    pub activity_feed: Vec<ActivityFeedItem>,
    /// Practice actions keyed by member id.
    pub practice_actions: BTreeMap<String, Vec<PracticeAction>>,
    pub program_state: ProgramState,
    pub upcoming_events: Vec<EventSummary>,
    pub community_stats: CommunityStats,
}

/// A generated discussion prompt body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionPromptBody {
    pub prompt: String,
    pub themes: Vec<String>,
}

/// Audit record of the inputs that produced one content row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationAudit {
    pub themes: Vec<String>,
    pub engagement_level: EngagementLevel,
    pub community: CommunityContext,
    pub members_targeted: Vec<String>,
}

/// Drives the generation pipeline end to end.
pub struct ContentOrchestrator {
    db: Database,
    generator: Arc<dyn TextGenerator>,
    config: GenerationConfig,
    max_tokens: u32,
}

impl ContentOrchestrator {
    pub fn new(
        db: Database,
        generator: Arc<dyn TextGenerator>,
        config: GenerationConfig,
        max_tokens: u32,
    ) -> Self {
        Self {
            db,
            generator,
            config,
            max_tokens,
        }
    }

    /// Run the daily dashboard generation and return the new draft row id.
    ///
    /// Steps: gather context, extract themes, band engagement, generate the
    /// hero message, generate the activity feed, generate batched practice
    /// actions, then store one draft row awaiting review.
    pub async fn run_daily_generation(&self, now: DateTime<Utc>) -> Result<String, CohortError> {
        let community = context::gather(&self.db, now, &self.config).await?;

        let texts: Vec<String> = community
            .discussions
            .iter()
            .map(|d| format!("{} {}", d.title, d.content))
            .collect();
        let themes = themes::extract_themes(&texts);

        let engagement_level =
            EngagementLevel::from_member_counts(community.active_users, community.total_users);
        debug!(%engagement_level, themes = ?themes, "generation inputs prepared");

        let hero_message = self.generate_hero(&community, &themes, engagement_level).await?;
        let activity_feed = self.generate_feed(&community, &themes).await?;

        let metrics = self.weekly_metrics(now).await?;
        let members_targeted: Vec<String> = metrics.iter().map(|m| m.user_id.clone()).collect();
        let practice_actions = self.generate_actions(&metrics, &themes).await?;

        let body = DashboardBody {
            hero_message,
            activity_feed,
            practice_actions,
            program_state: community.program_state.clone(),
            upcoming_events: community.upcoming_events.clone(),
            community_stats: CommunityStats {
                active_users: community.active_users,
                total_users: community.total_users,
                engagement_level,
            },
        };
        let audit = GenerationAudit {
            themes,
            engagement_level,
            community,
            members_targeted,
        };

        let id = self
            .store_draft(ContentType::FullDashboard, &body, &audit, now)
            .await?;
        info!(content_id = %id, "dashboard draft generated");
        Ok(id)
    }

    /// Generate a discussion prompt seeded by stuck discussions and return
    /// the new draft row id.
    ///
    /// A stuck discussion has many views but few replies: members are
    /// reading without engaging, and the prompt targets that gap.
    pub async fn run_discussion_prompt(&self, now: DateTime<Utc>) -> Result<String, CohortError> {
        let community = context::gather(&self.db, now, &self.config).await?;
        let stuck = discussions::stuck(
            &self.db,
            self.config.stuck_min_views,
            self.config.stuck_max_replies,
            self.config.feed_size,
        )
        .await?;

        let mut texts: Vec<String> = stuck
            .iter()
            .map(|d| format!("{} {}", d.title, d.body))
            .collect();
        if texts.is_empty() {
            texts = community
                .discussions
                .iter()
                .map(|d| format!("{} {}", d.title, d.content))
                .collect();
        }
        let themes = themes::extract_themes(&texts);

        let stuck_lines: Vec<String> = stuck
            .iter()
            .map(|d| format!("- {:?} ({} views, {} replies)", d.title, d.view_count, d.reply_count))
            .collect();
        let prompt = format!(
            "The cohort is in week {} ({}). Themes on members' minds: {}.\n\
             Discussions that drew readers but few replies:\n{}\n\
             Write one open-ended discussion prompt (2-3 sentences) that invites \
             members to share a concrete recent experience on one of these themes. \
             Return only the prompt text.",
            community.program_state.current_week,
            community.program_state.current_module,
            themes.join(", "),
            if stuck_lines.is_empty() {
                "(none this week)".to_string()
            } else {
                stuck_lines.join("\n")
            },
        );
        let text = self
            .generator
            .generate(GenerationRequest {
                system: "You facilitate a leadership development community. \
                         You write warm, specific, non-generic discussion prompts."
                    .to_string(),
                prompt,
                max_tokens: self.max_tokens,
            })
            .await?;

        let body = DiscussionPromptBody {
            prompt: text.trim().to_string(),
            themes: themes.clone(),
        };
        let engagement_level =
            EngagementLevel::from_member_counts(community.active_users, community.total_users);
        let audit = GenerationAudit {
            themes,
            engagement_level,
            community,
            members_targeted: Vec::new(),
        };

        let id = self
            .store_draft(ContentType::DiscussionPrompt, &body, &audit, now)
            .await?;
        info!(content_id = %id, stuck = stuck.len(), "discussion prompt draft generated");
        Ok(id)
    }

    async fn generate_hero(
        &self,
        community: &CommunityContext,
        themes: &[String],
        level: EngagementLevel,
    ) -> Result<String, CohortError> {
        let tone = match level {
            EngagementLevel::High => "Celebrate the momentum.",
            EngagementLevel::Medium => "Encourage members to take one small step this week.",
            EngagementLevel::Low => "Be gentle and lower the barrier to re-engaging.",
        };
        let next_event = community
            .upcoming_events
            .first()
            .map(|e| format!("Next community event: {}.\n", e.title))
            .unwrap_or_default();
        let prompt = format!(
            "Week {} of the program, current module: {}. {} of {} members were \
             active this week. Themes in recent discussions: {}.\n{}{}\n\
             Write a 2-3 sentence hero message for the community dashboard. \
             Return only the message text.",
            community.program_state.current_week,
            community.program_state.current_module,
            community.active_users,
            community.total_users,
            themes.join(", "),
            next_event,
            tone,
        );
        let text = self
            .generator
            .generate(GenerationRequest {
                system: "You write the daily welcome message for a leadership \
                         development community dashboard."
                    .to_string(),
                prompt,
                max_tokens: self.max_tokens,
            })
            .await?;
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(CohortError::Generator {
                message: "hero message generation returned empty text".to_string(),
                source: None,
            });
        }
        Ok(text)
    }

    async fn generate_feed(
        &self,
        community: &CommunityContext,
        themes: &[String],
    ) -> Result<Vec<ActivityFeedItem>, CohortError> {
        let discussion_lines: Vec<String> = community
            .discussions
            .iter()
            .map(|d| format!("- {:?} by {}: {}", d.title, d.author, d.content))
            .collect();
        let prompt = format!(
            "Recent community discussions:\n{}\n\
             Themes: {}.\n\
             Pick up to {} discussions worth surfacing and write a one-sentence \
             highlight for each. Respond with a JSON array of objects with keys \
             \"title\", \"author\", and \"highlight\". Return only JSON.",
            if discussion_lines.is_empty() {
                "(none)".to_string()
            } else {
                discussion_lines.join("\n")
            },
            themes.join(", "),
            self.config.feed_size,
        );
        let text = self
            .generator
            .generate(GenerationRequest {
                system: "You curate an activity feed for a leadership development \
                         community. You only output JSON."
                    .to_string(),
                prompt,
                max_tokens: self.max_tokens,
            })
            .await?;
        let mut feed: Vec<ActivityFeedItem> = parse_json_payload("activity feed", &text)?;
        feed.truncate(self.config.feed_size as usize);
        Ok(feed)
    }

    async fn generate_actions(
        &self,
        metrics: &[WeeklyMetrics],
        themes: &[String],
    ) -> Result<BTreeMap<String, Vec<PracticeAction>>, CohortError> {
        if metrics.is_empty() {
            return Ok(BTreeMap::new());
        }

        let member_lines: Vec<String> = metrics
            .iter()
            .map(|m| {
                format!(
                    "- {}: {} active days, {} posts, {} responses, {} modules done, \
                     last partner interaction: {}",
                    m.user_id,
                    m.days_active,
                    m.posts,
                    m.responses,
                    m.modules_completed,
                    m.last_partner_interaction.as_deref().unwrap_or("never"),
                )
            })
            .collect();
        let prompt = format!(
            "Weekly activity per member:\n{}\n\
             Community themes: {}.\n\
             For each member, write 2-3 personalized practice actions. Each action \
             has \"action\", \"why\", \"priority\" (1 is highest), and \"category\" \
             (one of connect, reflect, engage, practice, read). Respond with a JSON \
             object keyed by member id, each value an array of actions. Return only JSON.",
            member_lines.join("\n"),
            themes.join(", "),
        );
        let text = self
            .generator
            .generate(GenerationRequest {
                system: "You coach members of a leadership development community. \
                         You only output JSON."
                    .to_string(),
                prompt,
                max_tokens: self.max_tokens,
            })
            .await?;
        parse_json_payload("practice actions", &text)
    }

    /// Build per-member weekly metrics for every active member.
    async fn weekly_metrics(&self, now: DateTime<Utc>) -> Result<Vec<WeeklyMetrics>, CohortError> {
        let since = (now.date_naive() - Duration::days(7))
            .format("%Y-%m-%d")
            .to_string();
        let roster = members::list_active(&self.db).await?;

        let mut metrics = Vec::with_capacity(roster.len());
        for member in roster {
            let window = snapshots::window(&self.db, &member.id, &since).await?;
            let mut days_active = 0u32;
            let mut posts = 0u64;
            let mut responses = 0u64;
            let mut last_partner_interaction: Option<String> = None;
            for snapshot in &window {
                if snapshot.logins_count > 0 {
                    days_active += 1;
                }
                posts += snapshot.posts_count.max(0) as u64;
                responses += snapshot.responses_count.max(0) as u64;
                if let Some(interaction) = &snapshot.last_partner_interaction {
                    if last_partner_interaction
                        .as_deref()
                        .is_none_or(|seen| seen < interaction.as_str())
                    {
                        last_partner_interaction = Some(interaction.clone());
                    }
                }
            }
            metrics.push(WeeklyMetrics {
                user_id: member.id,
                days_active,
                posts,
                responses,
                modules_completed: member.modules_completed.max(0) as u64,
                last_partner_interaction,
            });
        }
        Ok(metrics)
    }

    async fn store_draft<B, A>(
        &self,
        content_type: ContentType,
        body: &B,
        audit: &A,
        now: DateTime<Utc>,
    ) -> Result<String, CohortError>
    where
        B: Serialize,
        A: Serialize,
    {
        let row = DashboardContentRow {
            id: Uuid::new_v4().to_string(),
            content_type: content_type.to_string(),
            content: serde_json::to_string(body)
                .map_err(|e| CohortError::Internal(format!("failed to serialize content: {e}")))?,
            generation_context: serde_json::to_string(audit).map_err(|e| {
                CohortError::Internal(format!("failed to serialize generation context: {e}"))
            })?,
            approved: false,
            active: false,
            generated_at: now.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        };
        content::insert(&self.db, &row).await?;
        Ok(row.id)
    }
}

/// Parse a generator response as JSON, tolerating a Markdown code fence.
///
/// Anything else that fails to parse aborts the run; drafts never hold
/// placeholder content.
pub(crate) fn parse_json_payload<T: serde::de::DeserializeOwned>(
    step: &str,
    text: &str,
) -> Result<T, CohortError> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(inner.trim()).map_err(|e| CohortError::Generator {
        message: format!("{step} response was not valid JSON: {e}"),
        source: Some(Box::new(e)),
    })
}
