//! Récupération et validation des tours auprès de la source amont.
//!
//! Les champs numériques arrivent indifféremment en nombres ou en chaînes
//! ("phien": "123456"), d'où le passage par `serde_json::Value`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use taixiu_db::models::{Outcome, Round, MAX_SUM, MIN_SUM};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamRecord {
    #[serde(default, alias = "phien", alias = "session")]
    pub id: Option<Value>,
    #[serde(default, alias = "xuc_xac_1")]
    pub dice1: Option<Value>,
    #[serde(default, alias = "xuc_xac_2")]
    pub dice2: Option<Value>,
    #[serde(default, alias = "xuc_xac_3")]
    pub dice3: Option<Value>,
    #[serde(default, alias = "tong")]
    pub total: Option<Value>,
    #[serde(default, alias = "ket_qua")]
    pub result: Option<String>,
}

impl UpstreamRecord {
    /// Libellé annoncé par la source, s'il est reconnu. Informatif seulement.
    pub fn reported_outcome(&self) -> Option<Outcome> {
        self.result.as_deref().and_then(Outcome::parse_label)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PayloadError {
    #[error("Champ manquant : {0}")]
    MissingField(&'static str),

    #[error("Identifiant de tour invalide : {0}")]
    InvalidId(String),

    #[error("Dé {index} invalide : {value}")]
    InvalidDie { index: usize, value: String },

    #[error("Somme invalide : {0}")]
    InvalidSum(String),

    #[error("Somme {0} hors limites (3-18)")]
    SumOutOfRange(i64),

    #[error("Somme annoncée {reported} différente de la somme des dés {computed}")]
    SumMismatch { reported: i64, computed: u8 },
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Erreur réseau : {0}")]
    Http(#[from] reqwest::Error),

    #[error("Réponse amont {0}")]
    Status(reqwest::StatusCode),

    #[error("Réponse amont illisible : {0}")]
    Decode(String),
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_die(index: usize, value: Option<&Value>) -> Result<u8, PayloadError> {
    let value = value.ok_or(PayloadError::MissingField(match index {
        1 => "dice1",
        2 => "dice2",
        _ => "dice3",
    }))?;
    match as_integer(value) {
        Some(d) if (1..=6).contains(&d) => Ok(d as u8),
        _ => Err(PayloadError::InvalidDie {
            index,
            value: value.to_string(),
        }),
    }
}

/// Valide un enregistrement amont. Aucun état n'est touché ici.
pub fn parse_record(record: &UpstreamRecord) -> Result<Round, PayloadError> {
    let id_value = record.id.as_ref().ok_or(PayloadError::MissingField("id"))?;
    let sequence_id = as_integer(id_value).ok_or_else(|| PayloadError::InvalidId(id_value.to_string()))?;

    let dice = [
        parse_die(1, record.dice1.as_ref())?,
        parse_die(2, record.dice2.as_ref())?,
        parse_die(3, record.dice3.as_ref())?,
    ];
    let computed: u8 = dice.iter().sum();

    if let Some(total_value) = &record.total {
        let reported = as_integer(total_value).ok_or_else(|| PayloadError::InvalidSum(total_value.to_string()))?;
        if reported < MIN_SUM as i64 || reported > MAX_SUM as i64 {
            return Err(PayloadError::SumOutOfRange(reported));
        }
        if reported != computed as i64 {
            return Err(PayloadError::SumMismatch { reported, computed });
        }
    }

    Round::new(sequence_id, dice).map_err(|e| PayloadError::InvalidDie {
        index: 0,
        value: e.to_string(),
    })
}

#[async_trait]
pub trait RoundSource: Send + Sync {
    async fn fetch(&self) -> Result<UpstreamRecord, FetchError>;
    fn describe(&self) -> String;
}

pub struct HttpRoundSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRoundSource {
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("taixiu/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl RoundSource for HttpRoundSource {
    async fn fetch(&self) -> Result<UpstreamRecord, FetchError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
