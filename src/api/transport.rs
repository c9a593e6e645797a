// ============================================================================
// Transports : proxies CORS et accès direct
// ============================================================================
// Un transport réécrit l'URL cible (préfixe de proxy, éventuellement avec
// l'URL encodée) et sait "déballer" la réponse du proxy.
//
// Trois proxies interchangeables :
// - allorigins : URL encodée, réponse enveloppée { "contents": "<json>" }
// - corsproxy  : URL encodée, JSON cible renvoyé tel quel
// - codetabs   : URL brute, JSON cible renvoyé tel quel
// Plus le transport direct (sans proxy), utilisé en dernier recours.
//
// CONCEPTS RUST :
// 1. Configuration par données plutôt que par if/else sur le nom du proxy
// 2. anyhow::bail! : erreur immédiate avec message
// ============================================================================

use std::fmt;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

/// Un moyen d'atteindre une URL cible
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    /// Nom court pour les logs (ex: "allorigins")
    pub name: String,

    /// Préfixe ajouté devant l'URL cible (vide pour le direct)
    pub prefix: String,

    /// L'URL cible doit-elle être percent-encodée ?
    pub encode_target: bool,

    /// La réponse est-elle enveloppée dans { "contents": "..." } ?
    pub enveloped: bool,
}

/// Enveloppe renvoyée par les proxies de type allorigins
#[derive(Debug, Deserialize)]
struct Envelope {
    contents: Option<String>,
}

impl Transport {
    /// Proxy qui encode l'URL et enveloppe la réponse
    pub fn enveloping_proxy(name: &str, prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            encode_target: true,
            enveloped: true,
        }
    }

    /// Proxy qui renvoie le JSON cible directement
    pub fn passthrough_proxy(name: &str, prefix: &str, encode_target: bool) -> Self {
        Self {
            name: name.to_string(),
            prefix: prefix.to_string(),
            encode_target,
            enveloped: false,
        }
    }

    /// Accès direct, sans proxy
    pub fn direct() -> Self {
        Self {
            name: "direct".to_string(),
            prefix: String::new(),
            encode_target: false,
            enveloped: false,
        }
    }

    /// Construit l'URL réellement requêtée pour atteindre `target`
    pub fn wrap(&self, target: &str) -> String {
        if self.prefix.is_empty() {
            return target.to_string();
        }

        if self.encode_target {
            format!("{}{}", self.prefix, urlencoding::encode(target))
        } else {
            format!("{}{}", self.prefix, target)
        }
    }

    /// Transforme le corps de réponse du proxy en JSON de l'API cible
    ///
    /// Pour un proxy enveloppant, le champ `contents` est lui-même du JSON
    /// sérialisé en chaîne : il faut le re-parser. Un `contents` absent est
    /// un échec de la tentative.
    pub fn unwrap_body(&self, body: &str) -> Result<Value> {
        if !self.enveloped {
            return serde_json::from_str(body)
                .with_context(|| format!("Réponse JSON invalide via {}", self.name));
        }

        let envelope: Envelope = serde_json::from_str(body)
            .with_context(|| format!("Enveloppe JSON invalide via {}", self.name))?;

        let contents = match envelope.contents {
            Some(contents) => contents,
            None => anyhow::bail!("Enveloppe {} sans champ contents", self.name),
        };

        serde_json::from_str(&contents)
            .with_context(|| format!("Contenu JSON invalide dans l'enveloppe {}", self.name))
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Liste par défaut des proxies, dans l'ordre de priorité
pub fn default_proxies() -> Vec<Transport> {
    vec![
        Transport::enveloping_proxy("allorigins", "https://api.allorigins.win/get?url="),
        Transport::passthrough_proxy("corsproxy", "https://corsproxy.io/?", true),
        Transport::passthrough_proxy("codetabs", "https://api.codetabs.com/v1/proxy?quest=", false),
    ]
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TARGET: &str = "https://query1.finance.yahoo.com/v8/finance/chart/005930.KS?interval=1d&range=1d";

    #[test]
    fn test_wrap_urls() {
        let proxies = default_proxies();

        let allorigins = proxies[0].wrap(TARGET);
        assert!(allorigins.starts_with("https://api.allorigins.win/get?url=https%3A%2F%2F"));
        assert!(allorigins.contains("%3Finterval%3D1d"));

        let corsproxy = proxies[1].wrap(TARGET);
        assert!(corsproxy.starts_with("https://corsproxy.io/?https%3A%2F%2F"));

        let codetabs = proxies[2].wrap(TARGET);
        assert_eq!(codetabs, format!("https://api.codetabs.com/v1/proxy?quest={}", TARGET));

        assert_eq!(Transport::direct().wrap(TARGET), TARGET);
    }

    #[test]
    fn test_unwrap_envelope() {
        let proxy = &default_proxies()[0];
        let body = r#"{"contents": "{\"chart\": {\"result\": []}}", "status": {}}"#;

        let value = proxy.unwrap_body(body).unwrap();
        assert!(value["chart"]["result"].is_array());
    }

    #[test]
    fn test_unwrap_envelope_without_contents_fails() {
        let proxy = &default_proxies()[0];
        assert!(proxy.unwrap_body(r#"{"status": {"http_code": 500}}"#).is_err());
        assert!(proxy.unwrap_body(r#"{"contents": "<html>"}"#).is_err());
    }

    #[test]
    fn test_unwrap_passthrough() {
        let proxy = &default_proxies()[1];
        assert!(proxy.unwrap_body(r#"{"chart": null}"#).is_ok());
        assert!(proxy.unwrap_body("not json").is_err());
    }
}
