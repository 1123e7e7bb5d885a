use crate::mapper::fields::{parse_date, parse_flag, parse_number, truncate};
use crate::models::{
    Contract, ContractBank, ContractFinance, ContractResources, ContractResponsible, Entity,
    LegalRep, MappedRow, RawContractRow, ResponsibleRole, RowBundle, Supplier, SupplierKey,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use smol_str::SmolStr;

fn text(value: &Option<String>, max: usize) -> Option<String> {
    truncate(value.as_deref(), max)
}

fn num(value: &Option<String>) -> Option<Decimal> {
    parse_number(value.as_deref())
}

fn date(value: &Option<String>) -> Option<NaiveDate> {
    parse_date(value.as_deref())
}

fn flag(value: &Option<String>) -> bool {
    parse_flag(value.as_deref())
}

//Turn one decoded row into the typed bundle the engine persists. Pure: all
//normalization happens here, no I/O. A row without organization name, nit or
//contract id cannot be keyed and is skipped outright.
pub fn map_record(raw: &RawContractRow) -> MappedRow {
    let nombre_entidad = match text(&raw.nombre_entidad, 300) {
        Some(n) => n,
        None => return MappedRow::Skip,
    };
    //nits are exported with grouping commas
    let nit_cleaned = raw.nit_entidad.as_deref().map(|s| s.replace(',', ""));
    let nit = match truncate(nit_cleaned.as_deref(), 20) {
        Some(n) => SmolStr::new(n),
        None => return MappedRow::Skip,
    };
    let id_contrato = match text(&raw.id_contrato, 80) {
        Some(id) => id,
        None => return MappedRow::Skip,
    };

    let entity = Entity {
        nit,
        nombre: nombre_entidad,
        departamento: text(&raw.departamento, 120),
        ciudad: text(&raw.ciudad, 120),
        localizacion: text(&raw.localizacion, 400),
        orden: text(&raw.orden, 120),
        sector: text(&raw.sector, 120),
        rama: text(&raw.rama, 120),
        centralizada: flag(&raw.entidad_centralizada),
        codigo: num(&raw.codigo_entidad),
    };

    let supplier = map_supplier(raw);

    let contract = Contract {
        id_contrato,
        proceso_de_compra: text(&raw.proceso_de_compra, 80),
        referencia: text(&raw.referencia_del_contrato, 120),
        estado: text(&raw.estado_contrato, 80),
        codigo_categoria: text(&raw.codigo_de_categoria_principal, 32),
        descripcion_proceso: text(&raw.descripcion_del_proceso, 1000),
        tipo: text(&raw.tipo_de_contrato, 120),
        modalidad: text(&raw.modalidad_de_contratacion, 200),
        justificacion_modalidad: text(&raw.justificacion_modalidad, 1000),
        fecha_firma: date(&raw.fecha_de_firma),
        fecha_inicio: date(&raw.fecha_inicio_contrato),
        fecha_fin: date(&raw.fecha_fin_contrato),
        fecha_inicio_ejecucion: date(&raw.fecha_inicio_ejecucion),
        fecha_fin_ejecucion: date(&raw.fecha_fin_ejecucion),
        condiciones_entrega: text(&raw.condiciones_de_entrega, 500),
        habilita_pago_adelantado: flag(&raw.habilita_pago_adelantado),
        liquidacion: flag(&raw.liquidacion),
        obligacion_ambiental: flag(&raw.obligacion_ambiental),
        obligaciones_postconsumo: flag(&raw.obligaciones_postconsumo),
        reversion: flag(&raw.reversion),
        origen_recursos: text(&raw.origen_de_los_recursos, 200),
        destino_gasto: text(&raw.destino_gasto, 200),
        estado_bpin: text(&raw.estado_bpin, 80),
        codigo_bpin: text(&raw.codigo_bpin, 50),
        anno_bpin: text(&raw.anno_bpin, 10),
        es_postconflicto: flag(&raw.es_postconflicto),
        dias_adicionados: num(&raw.dias_adicionados),
        puntos_acuerdo: text(&raw.puntos_del_acuerdo, 300),
        pilares_acuerdo: text(&raw.pilares_del_acuerdo, 300),
        url_proceso: text(&raw.url_proceso, 500),
        ultima_actualizacion: date(&raw.ultima_actualizacion),
        fecha_inicio_liquidacion: date(&raw.fecha_inicio_liquidacion),
        fecha_fin_liquidacion: date(&raw.fecha_fin_liquidacion),
        objeto: text(&raw.objeto_del_contrato, 1000),
        duracion: text(&raw.duracion_del_contrato, 200),
        puede_ser_prorrogado: flag(&raw.puede_ser_prorrogado),
        fecha_notificacion_prorrogacion: date(&raw.fecha_notificacion_prorrogacion),
    };

    let finance = ContractFinance {
        valor_del_contrato: num(&raw.valor_del_contrato),
        valor_pago_adelantado: num(&raw.valor_pago_adelantado),
        valor_facturado: num(&raw.valor_facturado),
        valor_pendiente_de_pago: num(&raw.valor_pendiente_de_pago),
        valor_pagado: num(&raw.valor_pagado),
        valor_amortizado: num(&raw.valor_amortizado),
        valor_pendiente_de_amortizacion: num(&raw.valor_pendiente_de_amortizacion),
        valor_pendiente_de_ejecucion: num(&raw.valor_pendiente_de_ejecucion),
        saldo_cdp: num(&raw.saldo_cdp),
        saldo_vigencia: num(&raw.saldo_vigencia),
    };

    let resources = ContractResources {
        presupuesto_general_nacion: num(&raw.presupuesto_general_nacion),
        sistema_general_participaciones: num(&raw.sistema_general_participaciones),
        sistema_general_regalias: num(&raw.sistema_general_regalias),
        recursos_propios_territoriales: num(&raw.recursos_propios_territoriales),
        recursos_de_credito: num(&raw.recursos_de_credito),
        recursos_propios: num(&raw.recursos_propios),
    };

    let bank = text(&raw.nombre_del_banco, 200).map(|nombre_banco| ContractBank {
        nombre_banco,
        tipo_cuenta: text(&raw.tipo_de_cuenta, 50),
        numero_cuenta: text(&raw.numero_de_cuenta, 50),
    });

    let mut responsibles = Vec::new();
    let roles = [
        (
            ResponsibleRole::Supervisor,
            &raw.nombre_supervisor,
            &raw.tipodoc_supervisor,
            &raw.numdoc_supervisor,
        ),
        (
            ResponsibleRole::OrdenadorGasto,
            &raw.nombre_ordenador_gasto,
            &raw.tipodoc_ordenador_gasto,
            &raw.numdoc_ordenador_gasto,
        ),
        (
            ResponsibleRole::OrdenadorPago,
            &raw.nombre_ordenador_pago,
            &raw.tipodoc_ordenador_pago,
            &raw.numdoc_ordenador_pago,
        ),
    ];
    for (rol, nombre, tipo_doc, numero_doc) in roles {
        if let Some(nombre) = text(nombre, 200) {
            responsibles.push(ContractResponsible {
                rol,
                nombre,
                tipo_documento: text(tipo_doc, 40),
                numero_documento: text(numero_doc, 40),
            });
        }
    }

    let legal_rep = text(&raw.nombre_representante_legal, 200).map(|nombre| LegalRep {
        nombre,
        nacionalidad: text(&raw.nacionalidad_representante_legal, 120),
        domicilio: text(&raw.domicilio_representante_legal, 250),
        tipo_identificacion: text(&raw.tipo_identificacion_representante_legal, 50),
        identificacion: text(&raw.identificacion_representante_legal, 50),
        genero: text(&raw.genero_representante_legal, 50),
    });

    MappedRow::Complete(Box::new(RowBundle {
        entity,
        supplier,
        contract,
        finance,
        resources,
        bank,
        responsibles,
        legal_rep,
    }))
}

//A supplier needs at least a display name or a document to exist at all.
//The natural key falls back document → code → name; name keys can collide
//on near-duplicates, which the schema tolerates.
fn map_supplier(raw: &RawContractRow) -> Option<Supplier> {
    let documento = text(&raw.documento_proveedor, 30);
    let codigo = text(&raw.codigo_proveedor, 50);
    let nombre = text(&raw.proveedor_adjudicado, 300);
    if nombre.is_none() && documento.is_none() {
        return None;
    }

    let (key, key_source) = if let Some(doc) = documento.as_deref() {
        (SmolStr::new(doc), SupplierKey::Documento)
    } else if let Some(cod) = codigo.as_deref() {
        (SmolStr::new(cod), SupplierKey::Codigo)
    } else {
        (SmolStr::new(nombre.as_deref().unwrap_or_default()), SupplierKey::Nombre)
    };

    Some(Supplier {
        key,
        key_source,
        codigo,
        tipodoc: text(&raw.tipodoc_proveedor, 100),
        documento,
        nombre,
        es_grupo: flag(&raw.es_grupo),
        es_pyme: flag(&raw.es_pyme),
    })
}
