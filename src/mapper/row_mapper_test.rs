#[cfg(test)]
mod tests {
    use crate::mapper::row_mapper::map_record;
    use crate::models::{MappedRow, RawContractRow, ResponsibleRole, RowBundle, SupplierKey};
    use rust_decimal_macros::dec;

    //the smallest row the mapper will accept
    fn base_row() -> RawContractRow {
        RawContractRow {
            nombre_entidad: Some("Alcaldía de Prueba".to_string()),
            nit_entidad: Some("900123456".to_string()),
            id_contrato: Some("C-001".to_string()),
            ..Default::default()
        }
    }

    fn map_complete(raw: &RawContractRow) -> Box<RowBundle> {
        match map_record(raw) {
            MappedRow::Complete(bundle) => bundle,
            MappedRow::Skip => panic!("expected a complete row"),
        }
    }

    #[test]
    fn test_skip_on_missing_required_fields() {
        let mut row = base_row();
        row.nombre_entidad = None;
        assert!(matches!(map_record(&row), MappedRow::Skip));

        let mut row = base_row();
        row.nit_entidad = Some("  ".to_string());
        assert!(matches!(map_record(&row), MappedRow::Skip));

        let mut row = base_row();
        row.id_contrato = None;
        assert!(matches!(map_record(&row), MappedRow::Skip));

        assert!(matches!(map_record(&base_row()), MappedRow::Complete(_)));
    }

    #[test]
    fn test_nit_commas_stripped() {
        let mut row = base_row();
        row.nit_entidad = Some("900,123,456".to_string());
        let bundle = map_complete(&row);
        assert_eq!(bundle.entity.nit.as_str(), "900123456");
    }

    #[test]
    fn test_entity_fields_normalized() {
        let mut row = base_row();
        row.nombre_entidad = Some("x".repeat(400));
        row.departamento = Some("  Antioquia ".to_string());
        row.entidad_centralizada = Some("Sí".to_string());
        row.codigo_entidad = Some("701234".to_string());
        let bundle = map_complete(&row);
        assert_eq!(bundle.entity.nombre.chars().count(), 300);
        assert_eq!(bundle.entity.departamento.as_deref(), Some("Antioquia"));
        assert!(bundle.entity.centralizada);
        assert_eq!(bundle.entity.codigo, Some(dec!(701234)));
    }

    #[test]
    fn test_supplier_key_fallback() {
        //document wins
        let mut row = base_row();
        row.documento_proveedor = Some("123456".to_string());
        row.codigo_proveedor = Some("COD-9".to_string());
        row.proveedor_adjudicado = Some("Ferretería El Tornillo".to_string());
        let bundle = map_complete(&row);
        let supplier = bundle.supplier.as_ref().unwrap();
        assert_eq!(supplier.key.as_str(), "123456");
        assert_eq!(supplier.key_source, SupplierKey::Documento);

        //then code
        let mut row = base_row();
        row.codigo_proveedor = Some("COD-9".to_string());
        row.proveedor_adjudicado = Some("Ferretería El Tornillo".to_string());
        let bundle = map_complete(&row);
        let supplier = bundle.supplier.as_ref().unwrap();
        assert_eq!(supplier.key.as_str(), "COD-9");
        assert_eq!(supplier.key_source, SupplierKey::Codigo);

        //then the display name
        let mut row = base_row();
        row.proveedor_adjudicado = Some("Ferretería El Tornillo".to_string());
        let bundle = map_complete(&row);
        let supplier = bundle.supplier.as_ref().unwrap();
        assert_eq!(supplier.key.as_str(), "Ferretería El Tornillo");
        assert_eq!(supplier.key_source, SupplierKey::Nombre);
    }

    #[test]
    fn test_supplier_requires_name_or_document() {
        //a bare code is not enough to identify a supplier
        let mut row = base_row();
        row.codigo_proveedor = Some("COD-9".to_string());
        let bundle = map_complete(&row);
        assert!(bundle.supplier.is_none());

        let bundle = map_complete(&base_row());
        assert!(bundle.supplier.is_none());
    }

    #[test]
    fn test_contract_values_normalized() {
        let mut row = base_row();
        row.id_contrato = Some("C".repeat(100));
        row.fecha_de_firma = Some("15/06/2023".to_string());
        row.puede_ser_prorrogado = Some("no".to_string());
        row.liquidacion = Some("Si".to_string());
        row.dias_adicionados = Some("30".to_string());
        let bundle = map_complete(&row);
        assert_eq!(bundle.contract.id_contrato.chars().count(), 80);
        assert_eq!(
            bundle.contract.fecha_firma,
            chrono::NaiveDate::from_ymd_opt(2023, 6, 15)
        );
        assert!(!bundle.contract.puede_ser_prorrogado);
        assert!(bundle.contract.liquidacion);
        assert_eq!(bundle.contract.dias_adicionados, Some(dec!(30)));
    }

    #[test]
    fn test_finance_and_resources_parsed() {
        let mut row = base_row();
        row.valor_del_contrato = Some("$1,000.50".to_string());
        row.saldo_cdp = Some("bogus".to_string());
        row.recursos_propios = Some("250000".to_string());
        let bundle = map_complete(&row);
        assert_eq!(bundle.finance.valor_del_contrato, Some(dec!(1000.50)));
        assert_eq!(bundle.finance.saldo_cdp, None);
        assert_eq!(bundle.resources.recursos_propios, Some(dec!(250000)));
    }

    #[test]
    fn test_bank_only_with_name() {
        let mut row = base_row();
        row.tipo_de_cuenta = Some("Ahorros".to_string());
        let bundle = map_complete(&row);
        assert!(bundle.bank.is_none());

        row.nombre_del_banco = Some("Banco de Prueba".to_string());
        let bundle = map_complete(&row);
        let bank = bundle.bank.as_ref().unwrap();
        assert_eq!(bank.nombre_banco, "Banco de Prueba");
        assert_eq!(bank.tipo_cuenta.as_deref(), Some("Ahorros"));
    }

    #[test]
    fn test_responsibles_only_for_named_roles() {
        let mut row = base_row();
        row.nombre_supervisor = Some("Ana Gómez".to_string());
        row.tipodoc_supervisor = Some("CC".to_string());
        row.nombre_ordenador_pago = Some("Luis Ruiz".to_string());
        //ordenador del gasto has no name and must not appear
        row.tipodoc_ordenador_gasto = Some("CC".to_string());
        let bundle = map_complete(&row);
        assert_eq!(bundle.responsibles.len(), 2);
        assert_eq!(bundle.responsibles[0].rol, ResponsibleRole::Supervisor);
        assert_eq!(bundle.responsibles[0].nombre, "Ana Gómez");
        assert_eq!(bundle.responsibles[1].rol, ResponsibleRole::OrdenadorPago);
        assert_eq!(bundle.responsibles[1].rol.as_str(), "OrdenadorPago");
    }

    #[test]
    fn test_legal_rep_only_with_name() {
        let bundle = map_complete(&base_row());
        assert!(bundle.legal_rep.is_none());

        let mut row = base_row();
        row.nombre_representante_legal = Some("María Pérez".to_string());
        row.genero_representante_legal = Some("F".to_string());
        let bundle = map_complete(&row);
        let rep = bundle.legal_rep.as_ref().unwrap();
        assert_eq!(rep.nombre, "María Pérez");
        assert_eq!(rep.genero.as_deref(), Some("F"));
    }
}
