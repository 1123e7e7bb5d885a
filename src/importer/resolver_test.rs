#[cfg(test)]
mod tests {
    use crate::importer::resolver::{EntityKind, EntityResolver};
    use crate::models::{Entity, Supplier, SupplierKey};
    use smol_str::SmolStr;

    fn entity(nit: &str) -> Entity {
        Entity {
            nit: SmolStr::new(nit),
            nombre: format!("Entidad {nit}"),
            departamento: None,
            ciudad: None,
            localizacion: None,
            orden: None,
            sector: None,
            rama: None,
            centralizada: false,
            codigo: None,
        }
    }

    fn supplier(key: &str) -> Supplier {
        Supplier {
            key: SmolStr::new(key),
            key_source: SupplierKey::Documento,
            codigo: None,
            tipodoc: None,
            documento: Some(key.to_string()),
            nombre: None,
            es_grupo: false,
            es_pyme: false,
        }
    }

    #[test]
    fn test_stage_dedups_against_buffer_and_cache() {
        let mut resolver = EntityResolver::new();
        resolver.stage_entity(&entity("900123456"));
        resolver.stage_entity(&entity("900123456"));
        //same key staged twice produces a single pending row
        assert_eq!(resolver.take_pending_entities().len(), 1);

        resolver.absorb(
            EntityKind::Organization,
            vec![(SmolStr::new("900123456"), 7)],
        );
        //a cached key is never staged again
        resolver.stage_entity(&entity("900123456"));
        assert!(resolver.take_pending_entities().is_empty());
        assert_eq!(resolver.lookup(EntityKind::Organization, "900123456"), Some(7));
    }

    #[test]
    fn test_same_key_resolves_to_same_id() {
        let mut resolver = EntityResolver::new();
        resolver.stage_supplier(&supplier("123"));
        let pending = resolver.take_pending_suppliers();
        assert_eq!(pending.len(), 1);
        resolver.absorb(EntityKind::Supplier, vec![(SmolStr::new("123"), 42)]);
        resolver.commit_tx();

        let first = resolver.lookup(EntityKind::Supplier, "123");
        let second = resolver.lookup(EntityKind::Supplier, "123");
        assert_eq!(first, Some(42));
        assert_eq!(second, Some(42));
        //and nothing further is buffered for it
        resolver.stage_supplier(&supplier("123"));
        assert!(resolver.take_pending_suppliers().is_empty());
    }

    #[test]
    fn test_flush_threshold_signal() {
        let mut resolver = EntityResolver::with_limits(1000, 2);
        assert!(!resolver.stage_entity(&entity("1")));
        assert!(resolver.stage_entity(&entity("2")));
        //supplier buffer counts on its own
        let mut resolver = EntityResolver::with_limits(1000, 2);
        assert!(!resolver.stage_supplier(&supplier("a")));
        assert!(resolver.stage_supplier(&supplier("b")));
    }

    #[test]
    fn test_rollback_evicts_transaction_keys() {
        let mut resolver = EntityResolver::new();
        //committed earlier: survives the rollback
        resolver.absorb(EntityKind::Organization, vec![(SmolStr::new("old"), 1)]);
        resolver.commit_tx();

        resolver.absorb(EntityKind::Organization, vec![(SmolStr::new("new"), 2)]);
        resolver.stage_entity(&entity("unflushed"));
        resolver.rollback_tx();

        assert_eq!(resolver.lookup(EntityKind::Organization, "old"), Some(1));
        assert_eq!(resolver.lookup(EntityKind::Organization, "new"), None);
        //the unflushed buffer was discarded with the batch
        assert!(resolver.take_pending_entities().is_empty());
        //and the key can be staged again by a later batch
        resolver.stage_entity(&entity("unflushed"));
        assert_eq!(resolver.take_pending_entities().len(), 1);
    }

    #[test]
    fn test_preload_is_not_journaled() {
        let mut resolver = EntityResolver::new();
        resolver.preload(EntityKind::Supplier, vec![(SmolStr::new("warm"), 9)]);
        resolver.rollback_tx();
        assert_eq!(resolver.lookup(EntityKind::Supplier, "warm"), Some(9));
    }

    #[test]
    fn test_cache_trims_least_recently_used_half() {
        let mut resolver = EntityResolver::with_limits(4, 100);
        for (i, key) in ["k1", "k2", "k3", "k4"].iter().enumerate() {
            resolver.preload(
                EntityKind::Organization,
                vec![(SmolStr::new(*key), i as u64)],
            );
        }
        //touch k1 so it outranks k2 and k3
        assert!(resolver.lookup(EntityKind::Organization, "k1").is_some());
        resolver.preload(EntityKind::Organization, vec![(SmolStr::new("k5"), 5)]);

        let (cached, _) = resolver.cached_counts();
        assert!(cached < 5);
        assert!(resolver.lookup(EntityKind::Organization, "k1").is_some());
        assert!(resolver.lookup(EntityKind::Organization, "k5").is_some());
        assert!(resolver.lookup(EntityKind::Organization, "k2").is_none());
        assert!(resolver.lookup(EntityKind::Organization, "k3").is_none());
    }
}
