//! Cache des métadonnées (rues, priorités)
//!
//! Un seul écrivain (`MetadataCell`, détenu par la boucle de rafraîchissement),
//! des lecteurs multiples (`MetadataReader`). Le remplacement est atomique:
//! un lecteur voit l'ancienne ou la nouvelle table, jamais un état partiel.

use std::sync::Arc;

use tokio::sync::watch;

use crate::types::MetadataLookup;

type Slot = Option<Arc<MetadataLookup>>;

/// Côté écriture du cache, volontairement non clonable
#[derive(Debug)]
pub struct MetadataCell {
    tx: watch::Sender<Slot>,
}

/// Côté lecture du cache
#[derive(Debug, Clone)]
pub struct MetadataReader {
    rx: watch::Receiver<Slot>,
}

impl MetadataCell {
    /// Cache vide (aucune métadonnée chargée)
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx }
    }

    pub fn reader(&self) -> MetadataReader {
        MetadataReader {
            rx: self.tx.subscribe(),
        }
    }

    /// Remplace la table entière
    pub fn replace(&self, lookup: MetadataLookup) {
        self.tx.send_replace(Some(Arc::new(lookup)));
    }

    pub fn current(&self) -> Option<Arc<MetadataLookup>> {
        self.tx.borrow().clone()
    }
}

impl Default for MetadataCell {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataReader {
    /// Snapshot courant; `None` tant qu'aucun chargement n'a réussi
    pub fn current(&self) -> Option<Arc<MetadataLookup>> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(street: &str) -> MetadataLookup {
        let mut meta = MetadataLookup::default();
        meta.filter_values
            .streets
            .insert("1".to_string(), street.to_string());
        meta
    }

    #[test]
    fn test_empty_until_first_replace() {
        let cell = MetadataCell::new();
        let reader = cell.reader();
        assert!(reader.current().is_none());

        cell.replace(lookup("N STATE ST"));
        assert_eq!(
            reader.current().unwrap().street_name("1"),
            Some("N STATE ST")
        );
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let cell = MetadataCell::new();
        let reader = cell.reader();
        cell.replace(lookup("OLD"));

        let snapshot = reader.current().unwrap();
        cell.replace(lookup("NEW"));

        assert_eq!(snapshot.street_name("1"), Some("OLD"));
        assert_eq!(reader.current().unwrap().street_name("1"), Some("NEW"));
        assert_eq!(cell.current().unwrap().street_name("1"), Some("NEW"));
    }
}
