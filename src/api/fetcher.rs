// ============================================================================
// HttpFetch : accès HTTP du resolver
// ============================================================================
// Le resolver ne parle jamais directement à reqwest : il passe par ce trait.
// En production c'est ReqwestFetcher, dans les tests un faux client qui
// renvoie des réponses en mémoire et enregistre les URLs demandées.
//
// CONCEPTS RUST :
// 1. async-trait : méthodes async dans un trait (objet-safe)
// 2. Send + Sync : le fetcher peut vivre dans le worker tokio
// ============================================================================

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use tracing::debug;

/// User-Agent navigateur pour éviter le blocage par Yahoo
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Récupère le corps texte d'une URL
///
/// Toute réponse HTTP hors 2xx est une erreur.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    async fn get_text(&self, url: &str) -> Result<String>;
}

/// Implémentation reqwest utilisée par l'application
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    /// Crée le client HTTP partagé par toutes les requêtes
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: build_client()?,
        })
    }
}

#[async_trait]
impl HttpFetch for ReqwestFetcher {
    async fn get_text(&self, url: &str) -> Result<String> {
        debug!(url = %url, "Sending HTTP request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Échec de la requête HTTP")?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        // Vérifie que la réponse est un succès HTTP (200-299)
        if !status.is_success() {
            anyhow::bail!("Le serveur a retourné une erreur : HTTP {}", status);
        }

        response
            .text()
            .await
            .context("Échec de la lecture du corps de la réponse")
    }
}

/// Construit le client reqwest commun (resolver et service compagnon)
pub fn build_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(10))
        .build()
        .context("Échec de la création du client HTTP")
}

// ============================================================================
// Faux client pour les tests
// ============================================================================

#[cfg(test)]
pub mod fake {
    use std::sync::Mutex;

    use super::*;

    /// Faux fetcher : associe un fragment d'URL à un corps de réponse
    ///
    /// La première règle dont le fragment est contenu dans l'URL gagne.
    /// Sans règle, la requête échoue comme une erreur réseau.
    #[derive(Default)]
    pub struct FakeFetcher {
        rules: Vec<(String, String)>,
        pub requests: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(mut self, url_fragment: &str, body: &str) -> Self {
            self.rules.push((url_fragment.to_string(), body.to_string()));
            self
        }

        /// URLs demandées, dans l'ordre
        pub fn requested(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        /// Nombre de requêtes dont l'URL contient `fragment`
        pub fn count(&self, fragment: &str) -> usize {
            self.requested().iter().filter(|u| u.contains(fragment)).count()
        }
    }

    #[async_trait]
    impl HttpFetch for FakeFetcher {
        async fn get_text(&self, url: &str) -> Result<String> {
            self.requests.lock().unwrap().push(url.to_string());

            self.rules
                .iter()
                .find(|(fragment, _)| url.contains(fragment.as_str()))
                .map(|(_, body)| body.clone())
                .ok_or_else(|| anyhow::anyhow!("connexion refusée : {}", url))
        }
    }
}
