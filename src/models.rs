use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use smol_str::SmolStr;

//One decoded line of the SECOP export, keyed by the exact header names of the
//published dataset. Every column is optional; empty fields decode to None and
//a column missing from the header entirely behaves the same way.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawContractRow {
    #[serde(rename = "Nombre Entidad")]
    pub nombre_entidad: Option<String>,
    #[serde(rename = "Nit Entidad")]
    pub nit_entidad: Option<String>,
    #[serde(rename = "Departamento")]
    pub departamento: Option<String>,
    #[serde(rename = "Ciudad")]
    pub ciudad: Option<String>,
    #[serde(rename = "Localización")]
    pub localizacion: Option<String>,
    #[serde(rename = "Orden")]
    pub orden: Option<String>,
    #[serde(rename = "Sector")]
    pub sector: Option<String>,
    #[serde(rename = "Rama")]
    pub rama: Option<String>,
    #[serde(rename = "Entidad Centralizada")]
    pub entidad_centralizada: Option<String>,
    #[serde(rename = "Codigo Entidad")]
    pub codigo_entidad: Option<String>,

    #[serde(rename = "Codigo Proveedor")]
    pub codigo_proveedor: Option<String>,
    #[serde(rename = "TipoDocProveedor")]
    pub tipodoc_proveedor: Option<String>,
    #[serde(rename = "Documento Proveedor")]
    pub documento_proveedor: Option<String>,
    #[serde(rename = "Proveedor Adjudicado")]
    pub proveedor_adjudicado: Option<String>,
    #[serde(rename = "Es Grupo")]
    pub es_grupo: Option<String>,
    #[serde(rename = "Es Pyme")]
    pub es_pyme: Option<String>,

    #[serde(rename = "Nombre Representante Legal")]
    pub nombre_representante_legal: Option<String>,
    #[serde(rename = "Nacionalidad Representante Legal")]
    pub nacionalidad_representante_legal: Option<String>,
    #[serde(rename = "Domicilio Representante Legal")]
    pub domicilio_representante_legal: Option<String>,
    #[serde(rename = "Tipo de Identificación Representante Legal")]
    pub tipo_identificacion_representante_legal: Option<String>,
    #[serde(rename = "Identificación Representante Legal")]
    pub identificacion_representante_legal: Option<String>,
    #[serde(rename = "Género Representante Legal")]
    pub genero_representante_legal: Option<String>,

    #[serde(rename = "Proceso de Compra")]
    pub proceso_de_compra: Option<String>,
    #[serde(rename = "ID Contrato")]
    pub id_contrato: Option<String>,
    #[serde(rename = "Referencia del Contrato")]
    pub referencia_del_contrato: Option<String>,
    #[serde(rename = "Estado Contrato")]
    pub estado_contrato: Option<String>,
    #[serde(rename = "Codigo de Categoria Principal")]
    pub codigo_de_categoria_principal: Option<String>,
    #[serde(rename = "Descripcion del Proceso")]
    pub descripcion_del_proceso: Option<String>,
    #[serde(rename = "Tipo de Contrato")]
    pub tipo_de_contrato: Option<String>,
    #[serde(rename = "Modalidad de Contratacion")]
    pub modalidad_de_contratacion: Option<String>,
    #[serde(rename = "Justificacion Modalidad de Contratacion")]
    pub justificacion_modalidad: Option<String>,
    #[serde(rename = "Fecha de Firma")]
    pub fecha_de_firma: Option<String>,
    #[serde(rename = "Fecha de Inicio del Contrato")]
    pub fecha_inicio_contrato: Option<String>,
    #[serde(rename = "Fecha de Fin del Contrato")]
    pub fecha_fin_contrato: Option<String>,
    #[serde(rename = "Fecha de Inicio de Ejecucion")]
    pub fecha_inicio_ejecucion: Option<String>,
    #[serde(rename = "Fecha de Fin de Ejecucion")]
    pub fecha_fin_ejecucion: Option<String>,
    #[serde(rename = "Condiciones de Entrega")]
    pub condiciones_de_entrega: Option<String>,
    #[serde(rename = "Habilita Pago Adelantado")]
    pub habilita_pago_adelantado: Option<String>,
    #[serde(rename = "Liquidación")]
    pub liquidacion: Option<String>,
    #[serde(rename = "Obligación Ambiental")]
    pub obligacion_ambiental: Option<String>,
    #[serde(rename = "Obligaciones Postconsumo")]
    pub obligaciones_postconsumo: Option<String>,
    #[serde(rename = "Reversion")]
    pub reversion: Option<String>,
    #[serde(rename = "Origen de los Recursos")]
    pub origen_de_los_recursos: Option<String>,
    #[serde(rename = "Destino Gasto")]
    pub destino_gasto: Option<String>,
    #[serde(rename = "Estado BPIN")]
    pub estado_bpin: Option<String>,
    #[serde(rename = "Código BPIN")]
    pub codigo_bpin: Option<String>,
    #[serde(rename = "Anno BPIN")]
    pub anno_bpin: Option<String>,
    #[serde(rename = "EsPostConflicto")]
    pub es_postconflicto: Option<String>,
    #[serde(rename = "Dias adicionados")]
    pub dias_adicionados: Option<String>,
    #[serde(rename = "Puntos del Acuerdo")]
    pub puntos_del_acuerdo: Option<String>,
    #[serde(rename = "Pilares del Acuerdo")]
    pub pilares_del_acuerdo: Option<String>,
    #[serde(rename = "URLProceso")]
    pub url_proceso: Option<String>,
    #[serde(rename = "Ultima Actualizacion")]
    pub ultima_actualizacion: Option<String>,
    #[serde(rename = "Fecha Inicio Liquidacion")]
    pub fecha_inicio_liquidacion: Option<String>,
    #[serde(rename = "Fecha Fin Liquidacion")]
    pub fecha_fin_liquidacion: Option<String>,
    #[serde(rename = "Objeto del Contrato")]
    pub objeto_del_contrato: Option<String>,
    #[serde(rename = "Duración del contrato")]
    pub duracion_del_contrato: Option<String>,
    #[serde(rename = "El contrato puede ser prorrogado")]
    pub puede_ser_prorrogado: Option<String>,
    #[serde(rename = "Fecha de notificación de prorrogación")]
    pub fecha_notificacion_prorrogacion: Option<String>,

    #[serde(rename = "Valor del Contrato")]
    pub valor_del_contrato: Option<String>,
    #[serde(rename = "Valor de pago adelantado")]
    pub valor_pago_adelantado: Option<String>,
    #[serde(rename = "Valor Facturado")]
    pub valor_facturado: Option<String>,
    #[serde(rename = "Valor Pendiente de Pago")]
    pub valor_pendiente_de_pago: Option<String>,
    #[serde(rename = "Valor Pagado")]
    pub valor_pagado: Option<String>,
    #[serde(rename = "Valor Amortizado")]
    pub valor_amortizado: Option<String>,
    #[serde(rename = "Valor Pendiente de Amortizacion")]
    pub valor_pendiente_de_amortizacion: Option<String>,
    #[serde(rename = "Valor Pendiente de Ejecucion")]
    pub valor_pendiente_de_ejecucion: Option<String>,
    #[serde(rename = "Saldo CDP")]
    pub saldo_cdp: Option<String>,
    #[serde(rename = "Saldo Vigencia")]
    pub saldo_vigencia: Option<String>,

    #[serde(rename = "Presupuesto General de la Nacion – PGN")]
    pub presupuesto_general_nacion: Option<String>,
    #[serde(rename = "Sistema General de Participaciones")]
    pub sistema_general_participaciones: Option<String>,
    #[serde(rename = "Sistema General de Regalías")]
    pub sistema_general_regalias: Option<String>,
    #[serde(rename = "Recursos Propios (Alcaldías, Gobernaciones y Resguardos Indígenas)")]
    pub recursos_propios_territoriales: Option<String>,
    #[serde(rename = "Recursos de Credito")]
    pub recursos_de_credito: Option<String>,
    #[serde(rename = "Recursos Propios")]
    pub recursos_propios: Option<String>,

    #[serde(rename = "Nombre del banco")]
    pub nombre_del_banco: Option<String>,
    #[serde(rename = "Tipo de cuenta")]
    pub tipo_de_cuenta: Option<String>,
    #[serde(rename = "Número de cuenta")]
    pub numero_de_cuenta: Option<String>,

    #[serde(rename = "Nombre supervisor")]
    pub nombre_supervisor: Option<String>,
    #[serde(rename = "Tipo de documento supervisor")]
    pub tipodoc_supervisor: Option<String>,
    #[serde(rename = "Número de documento supervisor")]
    pub numdoc_supervisor: Option<String>,
    #[serde(rename = "Nombre ordenador del gasto")]
    pub nombre_ordenador_gasto: Option<String>,
    #[serde(rename = "Tipo de documento Ordenador del gasto")]
    pub tipodoc_ordenador_gasto: Option<String>,
    #[serde(rename = "Número de documento Ordenador del gasto")]
    pub numdoc_ordenador_gasto: Option<String>,
    #[serde(rename = "Nombre Ordenador de Pago")]
    pub nombre_ordenador_pago: Option<String>,
    #[serde(rename = "Tipo de documento Ordenador de Pago")]
    pub tipodoc_ordenador_pago: Option<String>,
    #[serde(rename = "Número de documento Ordenador de Pago")]
    pub numdoc_ordenador_pago: Option<String>,
}

//A raw row together with its 1-based position in the stream, as sent from the
//parser task to the engine. The position is what the checkpoint records.
#[derive(Debug)]
pub struct SourceRow {
    pub number: u64,
    pub record: RawContractRow,
}

//Buying organization, deduplicated on nit
#[derive(Debug, Clone)]
pub struct Entity {
    pub nit: SmolStr,
    pub nombre: String,
    pub departamento: Option<String>,
    pub ciudad: Option<String>,
    pub localizacion: Option<String>,
    pub orden: Option<String>,
    pub sector: Option<String>,
    pub rama: Option<String>,
    pub centralizada: bool,
    pub codigo: Option<Decimal>,
}

//Which column carries the supplier's natural key. The export has no single
//reliable identifier: document wins over code, which wins over the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplierKey {
    Documento,
    Codigo,
    Nombre,
}

#[derive(Debug, Clone)]
pub struct Supplier {
    pub key: SmolStr,
    pub key_source: SupplierKey,
    pub codigo: Option<String>,
    pub tipodoc: Option<String>,
    pub documento: Option<String>,
    pub nombre: Option<String>,
    pub es_grupo: bool,
    pub es_pyme: bool,
}

#[derive(Debug, Clone)]
pub struct Contract {
    pub id_contrato: String,
    pub proceso_de_compra: Option<String>,
    pub referencia: Option<String>,
    pub estado: Option<String>,
    pub codigo_categoria: Option<String>,
    pub descripcion_proceso: Option<String>,
    pub tipo: Option<String>,
    pub modalidad: Option<String>,
    pub justificacion_modalidad: Option<String>,
    pub fecha_firma: Option<NaiveDate>,
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
    pub fecha_inicio_ejecucion: Option<NaiveDate>,
    pub fecha_fin_ejecucion: Option<NaiveDate>,
    pub condiciones_entrega: Option<String>,
    pub habilita_pago_adelantado: bool,
    pub liquidacion: bool,
    pub obligacion_ambiental: bool,
    pub obligaciones_postconsumo: bool,
    pub reversion: bool,
    pub origen_recursos: Option<String>,
    pub destino_gasto: Option<String>,
    pub estado_bpin: Option<String>,
    pub codigo_bpin: Option<String>,
    pub anno_bpin: Option<String>,
    pub es_postconflicto: bool,
    pub dias_adicionados: Option<Decimal>,
    pub puntos_acuerdo: Option<String>,
    pub pilares_acuerdo: Option<String>,
    pub url_proceso: Option<String>,
    pub ultima_actualizacion: Option<NaiveDate>,
    pub fecha_inicio_liquidacion: Option<NaiveDate>,
    pub fecha_fin_liquidacion: Option<NaiveDate>,
    pub objeto: Option<String>,
    pub duracion: Option<String>,
    pub puede_ser_prorrogado: bool,
    pub fecha_notificacion_prorrogacion: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct ContractFinance {
    pub valor_del_contrato: Option<Decimal>,
    pub valor_pago_adelantado: Option<Decimal>,
    pub valor_facturado: Option<Decimal>,
    pub valor_pendiente_de_pago: Option<Decimal>,
    pub valor_pagado: Option<Decimal>,
    pub valor_amortizado: Option<Decimal>,
    pub valor_pendiente_de_amortizacion: Option<Decimal>,
    pub valor_pendiente_de_ejecucion: Option<Decimal>,
    pub saldo_cdp: Option<Decimal>,
    pub saldo_vigencia: Option<Decimal>,
}

#[derive(Debug, Clone, Default)]
pub struct ContractResources {
    pub presupuesto_general_nacion: Option<Decimal>,
    pub sistema_general_participaciones: Option<Decimal>,
    pub sistema_general_regalias: Option<Decimal>,
    pub recursos_propios_territoriales: Option<Decimal>,
    pub recursos_de_credito: Option<Decimal>,
    pub recursos_propios: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct ContractBank {
    pub nombre_banco: String,
    pub tipo_cuenta: Option<String>,
    pub numero_cuenta: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponsibleRole {
    Supervisor,
    OrdenadorGasto,
    OrdenadorPago,
}

impl ResponsibleRole {
    //stored value of ContratoResponsable.rol
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponsibleRole::Supervisor => "Supervisor",
            ResponsibleRole::OrdenadorGasto => "OrdenadorGasto",
            ResponsibleRole::OrdenadorPago => "OrdenadorPago",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ContractResponsible {
    pub rol: ResponsibleRole,
    pub nombre: String,
    pub tipo_documento: Option<String>,
    pub numero_documento: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LegalRep {
    pub nombre: String,
    pub nacionalidad: Option<String>,
    pub domicilio: Option<String>,
    pub tipo_identificacion: Option<String>,
    pub identificacion: Option<String>,
    pub genero: Option<String>,
}

//Everything one source row contributes to the schema, ready for persistence
#[derive(Debug)]
pub struct RowBundle {
    pub entity: Entity,
    pub supplier: Option<Supplier>,
    pub contract: Contract,
    pub finance: ContractFinance,
    pub resources: ContractResources,
    pub bank: Option<ContractBank>,
    pub responsibles: Vec<ContractResponsible>,
    pub legal_rep: Option<LegalRep>,
}

//Outcome of mapping one raw row
#[derive(Debug)]
pub enum MappedRow {
    //a required identifying field was missing; counted apart from errors
    Skip,
    Complete(Box<RowBundle>),
}
