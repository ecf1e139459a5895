// 投資家リード
//
// ブローカーが管理する見込み投資家。ファネル上の段階（stage）と、
// 追記のみのタイムラインを持つ。

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use uuid::Uuid;

use super::validation::{deserialize_body, present_or_null, required_string_id, ValidationError};

/// リード作成時のタイムラインのアクション
pub const LEAD_CREATED_ACTION: &str = "Создан лид";

/// 段階変更時のタイムラインのアクション
pub const STAGE_CHANGED_ACTION: &str = "Этап изменён";

/// ファネル上の段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorStage {
    #[default]
    Lead,
    Consultation,
    Analysis,
    OfferSent,
    Negotiation,
    DealPreparation,
    Active,
    Inactive,
}

impl InvestorStage {
    pub const ALL: [InvestorStage; 8] = [
        InvestorStage::Lead,
        InvestorStage::Consultation,
        InvestorStage::Analysis,
        InvestorStage::OfferSent,
        InvestorStage::Negotiation,
        InvestorStage::DealPreparation,
        InvestorStage::Active,
        InvestorStage::Inactive,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestorStage::Lead => "lead",
            InvestorStage::Consultation => "consultation",
            InvestorStage::Analysis => "analysis",
            InvestorStage::OfferSent => "offer_sent",
            InvestorStage::Negotiation => "negotiation",
            InvestorStage::DealPreparation => "deal_preparation",
            InvestorStage::Active => "active",
            InvestorStage::Inactive => "inactive",
        }
    }
}

impl fmt::Display for InvestorStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestorStage {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| ValidationError::invalid("stage", s))
    }
}

/// タイムラインの1エントリ
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEntry {
    pub date: String,
    pub action: String,
    pub details: String,
}

impl TimelineEntry {
    /// リード作成エントリ
    pub fn lead_created(date: String, source: &str) -> Self {
        Self {
            date,
            action: LEAD_CREATED_ACTION.to_string(),
            details: format!("Источник: {}", source),
        }
    }

    /// 段階変更エントリ
    pub fn stage_changed(date: String, stage: InvestorStage) -> Self {
        Self {
            date,
            action: STAGE_CHANGED_ACTION.to_string(),
            details: format!("Новый этап: {}", stage),
        }
    }
}

/// タイムライン用の日時文字列（UTC、ミリ秒、`Z`付き）
pub fn timeline_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// 永続化済みの投資家
///
/// リスト列とタイムラインはJSONB。NULLは空配列として読み出す。
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Investor {
    pub id: String,
    pub broker_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub stage: Option<String>,
    pub profile_budget: f64,
    pub profile_strategies: Json<Vec<String>>,
    pub profile_risk_tolerance: Option<String>,
    pub profile_preferred_property_types: Json<Vec<String>>,
    pub profile_preferred_locations: Json<Vec<String>>,
    pub interaction_source: Option<String>,
    pub interaction_notes: Option<String>,
    pub interaction_last_contact: Option<NaiveDateTime>,
    pub timeline: Json<Vec<TimelineEntry>>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

/// 連絡先（キーは必須、値はnull可）
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    #[serde(deserialize_with = "present_or_null")]
    pub first_name: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    pub last_name: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    pub email: Option<String>,
    #[serde(deserialize_with = "present_or_null")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentProfile {
    pub budget: f64,
    pub strategies: Vec<String>,
    #[serde(deserialize_with = "present_or_null")]
    pub risk_tolerance: Option<String>,
    pub preferred_property_types: Vec<String>,
    pub preferred_locations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Interaction {
    pub source: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Metadata {
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewInvestorBody {
    broker_id: String,
    #[serde(default)]
    stage: Option<String>,
    personal_info: PersonalInfo,
    investment_profile: InvestmentProfile,
    interaction: Interaction,
    #[serde(default)]
    metadata: Option<Metadata>,
}

/// 投資家作成リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvestor {
    pub broker_id: String,
    pub stage: InvestorStage,
    pub personal_info: PersonalInfo,
    pub investment_profile: InvestmentProfile,
    pub interaction: Interaction,
    pub created_at: Option<String>,
}

impl NewInvestor {
    pub fn from_body(body: Value) -> Result<Self, ValidationError> {
        let raw: NewInvestorBody = deserialize_body(body)?;

        let stage = match raw.stage.as_deref() {
            None | Some("") => InvestorStage::default(),
            Some(stage) => stage.parse()?,
        };

        Ok(Self {
            broker_id: raw.broker_id,
            stage,
            personal_info: raw.personal_info,
            investment_profile: raw.investment_profile,
            interaction: raw.interaction,
            created_at: raw.metadata.and_then(|m| m.created_at),
        })
    }

    /// 保存するメモ（未指定は空文字列）
    pub fn notes(&self) -> &str {
        self.interaction.notes.as_deref().unwrap_or_default()
    }

    /// 初期タイムライン
    ///
    /// 日時は`metadata.createdAt`があればそれを、なければ`now`を使う。
    pub fn initial_timeline(&self, now: DateTime<Utc>) -> Vec<TimelineEntry> {
        let date = self
            .created_at
            .clone()
            .unwrap_or_else(|| timeline_timestamp(now));
        vec![TimelineEntry::lead_created(
            date,
            &self.interaction.source,
        )]
    }
}

#[derive(Deserialize, Default)]
struct InteractionPatch {
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
struct InvestorUpdateBody {
    #[serde(default)]
    stage: Option<String>,
    #[serde(default)]
    interaction: Option<InteractionPatch>,
}

/// 投資家更新リクエスト
///
/// stageとメモは指定された場合のみ更新する。
/// 最終接触日時と更新日時は常に打刻される。
#[derive(Debug, Clone, PartialEq)]
pub struct InvestorUpdate {
    pub id: String,
    pub stage: Option<InvestorStage>,
    pub notes: Option<String>,
}

impl InvestorUpdate {
    pub fn from_body(body: Value) -> Result<Self, ValidationError> {
        let id = required_string_id(&body, "Investor ID required")?;
        let raw: InvestorUpdateBody = deserialize_body(body)?;

        let stage = raw
            .stage
            .as_deref()
            .map(InvestorStage::from_str)
            .transpose()?;

        Ok(Self {
            id,
            stage,
            notes: raw.interaction.unwrap_or_default().notes,
        })
    }

    /// 更新で追記するタイムラインエントリ
    pub fn timeline_entries(&self, now: DateTime<Utc>) -> Vec<TimelineEntry> {
        self.stage
            .map(|stage| TimelineEntry::stage_changed(timeline_timestamp(now), stage))
            .into_iter()
            .collect()
    }
}

/// 新しい投資家IDを生成
pub fn generate_investor_id() -> String {
    Uuid::new_v4().to_string()
}
