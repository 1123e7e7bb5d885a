use crate::models::{
    Contract, ContractBank, ContractFinance, ContractResources, ContractResponsible, Entity,
    LegalRep, Supplier, SupplierKey,
};
use ahash::AHashMap;
use smol_str::SmolStr;
use sqlx::{MySql, MySqlConnection, QueryBuilder, Row};

//multi-row statements stay well under the server's placeholder limit
const CHUNK_ROWS: usize = 500;

const INSERT_CONTRACT: &str = "\
INSERT IGNORE INTO Contrato (
    EntidadId, ProveedorId, proceso_de_compra, id_contrato,
    referencia_del_contrato, estado_contrato, codigo_de_categoria_principal,
    descripcion_del_proceso, tipo_de_contrato, modalidad_de_contratacion,
    justificacion_modalidad_de, fecha_de_firma, fecha_de_inicio_del_contrato,
    fecha_de_fin_del_contrato, fecha_de_inicio_de_ejecucion, fecha_de_fin_de_ejecucion,
    condiciones_de_entrega, habilita_pago_adelantado, liquidacion,
    obligacion_ambiental, obligaciones_postconsumo, reversion,
    origen_de_los_recursos, destino_gasto, estado_bpin, codigo_bpin,
    anno_bpin, espostconflicto, dias_adicionados, puntos_del_acuerdo,
    pilares_del_acuerdo, urlproceso, ultima_actualizacion,
    fecha_inicio_liquidacion, fecha_fin_liquidacion, objeto_del_contrato,
    duracion_del_contrato, el_contrato_puede_ser_prorrogado,
    fecha_de_notificacion_de_prorrogacion
) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)";

//Bulk-insert unseen organizations, then read the assigned ids back by natural
//key. The re-query is deliberate: with INSERT IGNORE the store may skip rows,
//so id assignment can never be inferred from insert order.
pub async fn insert_entities(
    conn: &mut MySqlConnection,
    pending: &[Entity],
) -> Result<Vec<(SmolStr, u64)>, sqlx::Error> {
    for chunk in pending.chunks(CHUNK_ROWS) {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT IGNORE INTO Entidad (nombre_entidad, nit_entidad, departamento, ciudad, \
             localizacion, orden, sector, rama, entidad_centralizada, codigo_entidad) ",
        );
        qb.push_values(chunk.iter(), |mut b, e| {
            b.push_bind(&e.nombre)
                .push_bind(e.nit.as_str())
                .push_bind(&e.departamento)
                .push_bind(&e.ciudad)
                .push_bind(&e.localizacion)
                .push_bind(&e.orden)
                .push_bind(&e.sector)
                .push_bind(&e.rama)
                .push_bind(e.centralizada)
                .push_bind(e.codigo);
        });
        qb.build().execute(&mut *conn).await?;
    }

    let mut out = Vec::with_capacity(pending.len());
    for chunk in pending.chunks(CHUNK_ROWS) {
        let mut qb: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT EntidadId, nit_entidad FROM Entidad WHERE nit_entidad IN (");
        let mut sep = qb.separated(", ");
        for entity in chunk {
            sep.push_bind(entity.nit.as_str());
        }
        qb.push(")");
        for row in qb.build().fetch_all(&mut *conn).await? {
            let id: u64 = row.try_get(0)?;
            let nit: String = row.try_get(1)?;
            out.push((SmolStr::new(nit), id));
        }
    }
    Ok(out)
}

//Suppliers have no single key column, so insert-or-ignore cannot carry the
//dedup: read existing ids per key column, insert only what is genuinely new,
//then read again for the fresh ids.
pub async fn insert_suppliers(
    conn: &mut MySqlConnection,
    pending: &[Supplier],
) -> Result<Vec<(SmolStr, u64)>, sqlx::Error> {
    const SOURCES: [SupplierKey; 3] = [
        SupplierKey::Documento,
        SupplierKey::Codigo,
        SupplierKey::Nombre,
    ];

    let mut resolved: AHashMap<SmolStr, u64> = AHashMap::with_capacity(pending.len());
    for source in SOURCES {
        select_supplier_ids(conn, source, pending, &mut resolved).await?;
    }

    let missing: Vec<&Supplier> = pending
        .iter()
        .filter(|s| !resolved.contains_key(&s.key))
        .collect();
    for chunk in missing.chunks(CHUNK_ROWS) {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(
            "INSERT INTO Proveedor (codigo_proveedor, tipodocproveedor, documento_proveedor, \
             proveedor_adjudicado, es_grupo, es_pyme) ",
        );
        qb.push_values(chunk.iter(), |mut b, s| {
            b.push_bind(&s.codigo)
                .push_bind(&s.tipodoc)
                .push_bind(&s.documento)
                .push_bind(&s.nombre)
                .push_bind(s.es_grupo)
                .push_bind(s.es_pyme);
        });
        qb.build().execute(&mut *conn).await?;
    }

    if !missing.is_empty() {
        for source in SOURCES {
            select_supplier_ids(conn, source, pending, &mut resolved).await?;
        }
    }

    Ok(pending
        .iter()
        .filter_map(|s| resolved.get(&s.key).map(|id| (s.key.clone(), *id)))
        .collect())
}

async fn select_supplier_ids(
    conn: &mut MySqlConnection,
    source: SupplierKey,
    pending: &[Supplier],
    resolved: &mut AHashMap<SmolStr, u64>,
) -> Result<(), sqlx::Error> {
    let column = match source {
        SupplierKey::Documento => "documento_proveedor",
        SupplierKey::Codigo => "codigo_proveedor",
        SupplierKey::Nombre => "proveedor_adjudicado",
    };
    let keys: Vec<&str> = pending
        .iter()
        .filter(|s| s.key_source == source && !resolved.contains_key(&s.key))
        .map(|s| s.key.as_str())
        .collect();

    for chunk in keys.chunks(CHUNK_ROWS) {
        let mut qb: QueryBuilder<MySql> = QueryBuilder::new(format!(
            "SELECT ProveedorId, {column} FROM Proveedor WHERE {column} IN ("
        ));
        let mut sep = qb.separated(", ");
        for key in chunk {
            sep.push_bind(*key);
        }
        qb.push(")");
        for row in qb.build().fetch_all(&mut *conn).await? {
            let id: u64 = row.try_get(0)?;
            let key: String = row.try_get(1)?;
            //first row wins when a free-text name matches several suppliers
            resolved.entry(SmolStr::new(key)).or_insert(id);
        }
    }
    Ok(())
}

//Returns the surrogate id of the inserted contract, or None when the external
//contract id already exists and the insert was a no-op. Callers must not
//create dependent rows for a no-op.
pub async fn insert_contract(
    conn: &mut MySqlConnection,
    entidad_id: u64,
    proveedor_id: Option<u64>,
    c: &Contract,
) -> Result<Option<u64>, sqlx::Error> {
    let result = sqlx::query(INSERT_CONTRACT)
        .bind(entidad_id)
        .bind(proveedor_id)
        .bind(&c.proceso_de_compra)
        .bind(&c.id_contrato)
        .bind(&c.referencia)
        .bind(&c.estado)
        .bind(&c.codigo_categoria)
        .bind(&c.descripcion_proceso)
        .bind(&c.tipo)
        .bind(&c.modalidad)
        .bind(&c.justificacion_modalidad)
        .bind(c.fecha_firma)
        .bind(c.fecha_inicio)
        .bind(c.fecha_fin)
        .bind(c.fecha_inicio_ejecucion)
        .bind(c.fecha_fin_ejecucion)
        .bind(&c.condiciones_entrega)
        .bind(c.habilita_pago_adelantado)
        .bind(c.liquidacion)
        .bind(c.obligacion_ambiental)
        .bind(c.obligaciones_postconsumo)
        .bind(c.reversion)
        .bind(&c.origen_recursos)
        .bind(&c.destino_gasto)
        .bind(&c.estado_bpin)
        .bind(&c.codigo_bpin)
        .bind(&c.anno_bpin)
        .bind(c.es_postconflicto)
        .bind(c.dias_adicionados)
        .bind(&c.puntos_acuerdo)
        .bind(&c.pilares_acuerdo)
        .bind(&c.url_proceso)
        .bind(c.ultima_actualizacion)
        .bind(c.fecha_inicio_liquidacion)
        .bind(c.fecha_fin_liquidacion)
        .bind(&c.objeto)
        .bind(&c.duracion)
        .bind(c.puede_ser_prorrogado)
        .bind(c.fecha_notificacion_prorrogacion)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        Ok(None)
    } else {
        Ok(Some(result.last_insert_id()))
    }
}

pub async fn insert_finance(
    conn: &mut MySqlConnection,
    contrato_id: u64,
    f: &ContractFinance,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT IGNORE INTO ContratoFinanzas (
            ContratoId, valor_del_contrato, valor_de_pago_adelantado,
            valor_facturado, valor_pendiente_de_pago, valor_pagado,
            valor_amortizado, valor_pendiente_de_amortizacion,
            valor_pendiente_de_ejecucion, saldo_cdp, saldo_vigencia
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(contrato_id)
    .bind(f.valor_del_contrato)
    .bind(f.valor_pago_adelantado)
    .bind(f.valor_facturado)
    .bind(f.valor_pendiente_de_pago)
    .bind(f.valor_pagado)
    .bind(f.valor_amortizado)
    .bind(f.valor_pendiente_de_amortizacion)
    .bind(f.valor_pendiente_de_ejecucion)
    .bind(f.saldo_cdp)
    .bind(f.saldo_vigencia)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn insert_resources(
    conn: &mut MySqlConnection,
    contrato_id: u64,
    r: &ContractResources,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT IGNORE INTO ContratoRecursos (
            ContratoId, presupuesto_general_de_la_nacion_pgn, sistema_general_de_participaciones,
            sistema_general_de_regalias, recursos_propios_alcaldias_gobernaciones_resguardos,
            recursos_de_credito, recursos_propios
        ) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(contrato_id)
    .bind(r.presupuesto_general_nacion)
    .bind(r.sistema_general_participaciones)
    .bind(r.sistema_general_regalias)
    .bind(r.recursos_propios_territoriales)
    .bind(r.recursos_de_credito)
    .bind(r.recursos_propios)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn insert_bank(
    conn: &mut MySqlConnection,
    contrato_id: u64,
    b: &ContractBank,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT IGNORE INTO ContratoBancario (ContratoId, nombre_del_banco, tipo_de_cuenta, numero_de_cuenta)
         VALUES (?, ?, ?, ?)",
    )
    .bind(contrato_id)
    .bind(&b.nombre_banco)
    .bind(&b.tipo_cuenta)
    .bind(&b.numero_cuenta)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn insert_responsible(
    conn: &mut MySqlConnection,
    contrato_id: u64,
    r: &ContractResponsible,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT IGNORE INTO ContratoResponsable (ContratoId, rol, nombre, tipo_documento, numero_documento)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(contrato_id)
    .bind(r.rol.as_str())
    .bind(&r.nombre)
    .bind(&r.tipo_documento)
    .bind(&r.numero_documento)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

//At most one representative per organization; the unique index over the full
//tuple makes re-imports a no-op.
pub async fn insert_legal_rep(
    conn: &mut MySqlConnection,
    entidad_id: u64,
    rep: &LegalRep,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT IGNORE INTO RepresentanteLegal (
            EntidadId, nombre_representante_legal, nacionalidad_representante_legal,
            domicilio_representante_legal, tipo_de_identificacion_representante_legal,
            identificacion_representante_legal, genero_representante_legal
        ) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(entidad_id)
    .bind(&rep.nombre)
    .bind(&rep.nacionalidad)
    .bind(&rep.domicilio)
    .bind(&rep.tipo_identificacion)
    .bind(&rep.identificacion)
    .bind(&rep.genero)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

//Warm-start queries: most recent lookup rows first, bounded by the cache cap.
pub async fn preload_entities(
    conn: &mut MySqlConnection,
    limit: u64,
) -> Result<Vec<(SmolStr, u64)>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT EntidadId, nit_entidad FROM Entidad ORDER BY EntidadId DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let id: u64 = row.try_get(0)?;
        let nit: String = row.try_get(1)?;
        out.push((SmolStr::new(nit), id));
    }
    Ok(out)
}

pub async fn preload_suppliers(
    conn: &mut MySqlConnection,
    limit: u64,
) -> Result<Vec<(SmolStr, u64)>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT ProveedorId, COALESCE(documento_proveedor, codigo_proveedor, proveedor_adjudicado) \
         FROM Proveedor ORDER BY ProveedorId DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(&mut *conn)
    .await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let id: u64 = row.try_get(0)?;
        let key: Option<String> = row.try_get(1)?;
        if let Some(key) = key {
            out.push((SmolStr::new(key), id));
        }
    }
    Ok(out)
}
