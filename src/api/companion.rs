// ============================================================================
// Client du service compagnon local (news et export de graphique)
// ============================================================================
// Le service tourne à côté du tableau de bord (http://localhost:5000) :
// - GET  /api/naver/news?code={code}  -> [{ title, press, date, url }]
// - POST /api/stock-chart {symbol, name} -> image PNG en binaire
//
// Contrairement au resolver, ces appels sont des actions directes de
// l'utilisateur : les erreurs remontent (anyhow) pour être affichées.
// ============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::api::fetcher::build_client;
use crate::config::CompanionConfig;
use crate::models::format::format_news_date;

/// Un article de news sur un titre
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: Option<String>,
    pub press: Option<String>,
    /// Date brute "YYYYMMDDHHmm"
    pub date: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl NewsItem {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("(sans titre)")
    }

    /// Ligne "journal · 2024.01.15 14:30"
    pub fn meta_line(&self) -> String {
        let press = self.press.as_deref().unwrap_or("");
        let date = self.date.as_deref().map(format_news_date).unwrap_or_default();
        format!("{} · {}", press, date)
    }
}

/// Corps de la requête d'export
#[derive(Debug, Serialize)]
struct ExportRequest<'a> {
    symbol: &'a str,
    name: &'a str,
}

/// Corps d'erreur renvoyé par le service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Client HTTP du service compagnon
#[derive(Debug, Clone)]
pub struct CompanionClient {
    client: reqwest::Client,
    base_url: String,
}

impl CompanionClient {
    pub fn new(config: &CompanionConfig) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn news_url(&self, code: &str) -> String {
        format!("{}/api/naver/news?code={}", self.base_url, urlencoding::encode(code))
    }

    /// Récupère les news d'un titre (code court, ex: "005930")
    #[instrument(skip(self))]
    pub async fn fetch_news(&self, code: &str) -> Result<Vec<NewsItem>> {
        let url = self.news_url(code);
        debug!(url = %url, "Fetching news");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Impossible de joindre le service de news")?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "News service returned error status");
            anyhow::bail!("Le service de news a retourné une erreur : HTTP {}", status);
        }

        let news: Vec<NewsItem> = response
            .json()
            .await
            .context("Échec du parsing JSON des news")?;

        info!(count = news.len(), "News loaded");
        Ok(news)
    }

    /// Demande au service une image PNG du graphique d'un titre
    #[instrument(skip(self))]
    pub async fn export_chart(&self, symbol: &str, name: &str) -> Result<Vec<u8>> {
        let url = format!("{}/api/stock-chart", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ExportRequest { symbol, name })
            .send()
            .await
            .context("Impossible de joindre le service d'export. Le serveur compagnon est-il lancé ?")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, "Chart export failed");
            anyhow::bail!("Échec de la génération du graphique : {}", error_message(&body));
        }

        let bytes = response
            .bytes()
            .await
            .context("Échec de la lecture de l'image")?;

        info!(size = bytes.len(), "Chart image received");
        Ok(bytes.to_vec())
    }

    /// Exporte le graphique et l'écrit dans `dir`, retourne le chemin du fichier
    pub async fn export_chart_to(&self, symbol: &str, name: &str, dir: &Path) -> Result<PathBuf> {
        let bytes = self.export_chart(symbol, name).await?;
        let path = dir.join(export_file_name(symbol, name));

        tokio::fs::write(&path, &bytes)
            .await
            .with_context(|| format!("Impossible d'écrire {}", path.display()))?;

        info!(path = %path.display(), "Chart image saved");
        Ok(path)
    }
}

/// Nom du fichier exporté : "{nom}_{symbole avec '.' -> '_'}_chart.png"
pub fn export_file_name(symbol: &str, name: &str) -> String {
    format!("{}_{}_chart.png", name, symbol.replace('.', "_"))
}

/// Message d'erreur lisible à partir d'un corps { "error": "..." }
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| "erreur inconnue".to_string())
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            export_file_name("005930.KS", "삼성전자"),
            "삼성전자_005930_KS_chart.png"
        );
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"error": "심볼이 필요합니다"}"#), "심볼이 필요합니다");
        assert_eq!(error_message("Internal Server Error"), "erreur inconnue");
        assert_eq!(error_message("{}"), "erreur inconnue");
    }

    #[test]
    fn test_news_url() {
        let client = CompanionClient::new(&CompanionConfig {
            base_url: "http://localhost:5000/".to_string(),
        })
        .unwrap();
        assert_eq!(client.news_url("005930"), "http://localhost:5000/api/naver/news?code=005930");
    }

    #[test]
    fn test_news_item_deserialize_and_meta_line() {
        let json = r#"[{"title": "반도체 호황", "press": "연합뉴스", "date": "202401151430",
                        "url": "https://n.news.naver.com/article/001/0000001", "summary": "..."}]"#;
        let news: Vec<NewsItem> = serde_json::from_str(json).unwrap();

        assert_eq!(news[0].title(), "반도체 호황");
        assert_eq!(news[0].meta_line(), "연합뉴스 · 2024.01.15 14:30");

        let sparse: NewsItem = serde_json::from_str(r#"{"title": null, "press": null, "date": null, "url": null}"#).unwrap();
        assert_eq!(sparse.title(), "(sans titre)");
    }
}
