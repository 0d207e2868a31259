//! Formatage "il y a ..." d'une durée écoulée
//!
//! Pas de gestion du singulier: 60 000 ms donne "1 minutes ago".

const MS_PER_MINUTE: u64 = 60_000;

/// Convertit une durée écoulée (ms) en texte affichable
///
/// Les jours forcent l'affichage des heures et minutes, même nulles:
/// 25 h donne "1 days 1 hours 0 minutes ago".
pub fn time_ago(elapsed_ms: u64) -> String {
    let minutes = elapsed_ms / MS_PER_MINUTE;
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 1 {
        return "Just Now".to_string();
    }

    let mut parts = Vec::with_capacity(3);
    if days > 0 {
        parts.push(format!("{} days", days));
    }
    if hours % 24 > 0 || days > 0 {
        parts.push(format!("{} hours", hours % 24));
    }
    if minutes % 60 > 0 || days > 0 {
        parts.push(format!("{} minutes", minutes % 60));
    }

    format!("{} ago", parts.join(" "))
}

/// Variante pour les durées lues dans les flux (f64, possiblement négatives)
pub fn time_ago_f64(elapsed_ms: f64) -> String {
    let clamped = if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
        elapsed_ms.min(u64::MAX as f64) as u64
    } else {
        0
    };
    time_ago(clamped)
}
