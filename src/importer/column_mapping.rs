// ==========================================
// 供应链洞察 - 列映射表
// ==========================================
// 职责: 源列名 → 标准字段
// 每种记录类型一张显式映射表，校验阶段解析一次，处理阶段复用
// 匹配规则: 去首尾空白、小写、空格与 '-' 统一为 '_'
// ==========================================

use crate::domain::records::RawRow;
use crate::domain::types::RecordType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// 标准字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    // 通用
    ProductCode,
    // 库存
    Name,
    Group,
    Subgroup,
    Period,
    PreviousBalance,
    Entries,
    Exits,
    CurrentBalance,
    AverageCost,
    LastCost,
    UnitType,
    // 销售
    DocumentDate,
    DocumentNumber,
    Quantity,
    NetValue,
    GrossValue,
    Discount,
    Customer,
    Territory,
    Salesperson,
}

/// 字段值类型（决定校验方式）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Date,
}

/// 映射表条目
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: FieldKey,
    /// 报告中使用的标准列名
    pub label: &'static str,
    /// 可接受的源列名（按优先级）
    pub aliases: &'static [&'static str],
    pub required: bool,
    /// 关键字段: 无法解析时判定校验失败（否则只给警告）
    pub critical: bool,
    pub kind: FieldKind,
}

const fn field(
    key: FieldKey,
    label: &'static str,
    aliases: &'static [&'static str],
    required: bool,
    critical: bool,
    kind: FieldKind,
) -> FieldSpec {
    FieldSpec {
        key,
        label,
        aliases,
        required,
        critical,
        kind,
    }
}

// ==========================================
// 库存映射表
// ==========================================
pub const INVENTORY_FIELDS: &[FieldSpec] = &[
    field(FieldKey::ProductCode, "CODIGO", &["CODIGO", "product_code"], true, true, FieldKind::Text),
    field(FieldKey::Name, "NOMBRE", &["NOMBRE", "name"], true, false, FieldKind::Text),
    field(FieldKey::Group, "GRUPO", &["GRUPO", "group"], false, false, FieldKind::Text),
    field(FieldKey::Subgroup, "SUBGRUPO", &["SUBGRUPO", "subgroup"], false, false, FieldKind::Text),
    field(FieldKey::Period, "PERIODO", &["PERIODO", "period"], true, false, FieldKind::Date),
    field(FieldKey::PreviousBalance, "SALDO_ANTERIOR", &["SALDO_ANTERIOR", "previous_balance"], true, true, FieldKind::Number),
    field(FieldKey::Entries, "ENTRADAS", &["ENTRADAS", "entries"], true, true, FieldKind::Number),
    field(FieldKey::Exits, "SALIDAS", &["SALIDAS", "exits"], true, true, FieldKind::Number),
    field(FieldKey::CurrentBalance, "SALDO_ACTUAL", &["SALDO_ACTUAL", "current_balance"], true, true, FieldKind::Number),
    field(FieldKey::AverageCost, "COSTO_PROMEDIO", &["COSTO_PROMEDIO", "average_cost"], true, true, FieldKind::Number),
    field(FieldKey::LastCost, "ULTIMO_COSTO", &["ULTIMO_COSTO", "last_cost"], false, false, FieldKind::Number),
    field(FieldKey::UnitType, "UNIDAD", &["UNIDAD", "unit_type"], false, false, FieldKind::Text),
];

// ==========================================
// 销售映射表（含别名）
// ==========================================
pub const SALES_FIELDS: &[FieldSpec] = &[
    field(
        FieldKey::ProductCode,
        "CODIGO",
        &["CODIGO", "c_producto", "codigo_producto", "producto", "product_code"],
        true,
        true,
        FieldKind::Text,
    ),
    field(
        FieldKey::DocumentDate,
        "FECHA",
        &["FECHA", "d_fecha", "fecha_documento", "d_fecha_documento", "document_date"],
        true,
        false,
        FieldKind::Date,
    ),
    field(
        FieldKey::DocumentNumber,
        "NUMERO_DOCUMENTO",
        &["NUMERO_DOCUMENTO", "n_documento", "documento", "document_number"],
        false,
        false,
        FieldKind::Text,
    ),
    field(
        FieldKey::Quantity,
        "CANTIDAD",
        &["CANTIDAD", "n_cantidad", "quantity"],
        true,
        true,
        FieldKind::Number,
    ),
    field(
        FieldKey::NetValue,
        "VALOR_NETO",
        &["VALOR_NETO", "n_valor_neto", "neto", "net_value"],
        true,
        true,
        FieldKind::Number,
    ),
    field(
        FieldKey::GrossValue,
        "VALOR_BRUTO",
        &["VALOR_BRUTO", "n_valor_bruto", "bruto", "gross_value"],
        false,
        false,
        FieldKind::Number,
    ),
    field(
        FieldKey::Discount,
        "DESCUENTO",
        &["DESCUENTO", "n_descuento", "discount"],
        false,
        false,
        FieldKind::Number,
    ),
    field(
        FieldKey::Customer,
        "CLIENTE",
        &["CLIENTE", "c_cliente", "nombre_cliente", "customer"],
        false,
        false,
        FieldKind::Text,
    ),
    field(
        FieldKey::Territory,
        "TERRITORIO",
        &["TERRITORIO", "zona", "c_zona", "territory"],
        false,
        false,
        FieldKind::Text,
    ),
    field(
        FieldKey::Salesperson,
        "VENDEDOR",
        &["VENDEDOR", "c_vendedor", "salesperson"],
        false,
        false,
        FieldKind::Text,
    ),
];

/// 按记录类型取映射表
pub fn field_specs(record_type: RecordType) -> &'static [FieldSpec] {
    match record_type {
        RecordType::Inventory => INVENTORY_FIELDS,
        RecordType::Sales => SALES_FIELDS,
    }
}

/// 列名归一化
pub fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

// ==========================================
// ColumnMapping - 已解析的列映射
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub record_type: RecordType,
    /// 标准字段 → 源列名
    pub resolved: BTreeMap<FieldKey, String>,
    /// 缺失的必填字段（标准列名）
    pub missing_required: Vec<String>,
    /// 映射表之外的源列
    pub unmapped_columns: Vec<String>,
}

impl ColumnMapping {
    /// 根据源列名解析映射（每个源列最多映射一个字段）
    pub fn resolve(record_type: RecordType, headers: &[String]) -> Self {
        let mut resolved = BTreeMap::new();
        let mut missing_required = Vec::new();
        let mut used: HashSet<&str> = HashSet::new();

        for spec in field_specs(record_type) {
            let hit = spec.aliases.iter().find_map(|alias| {
                let wanted = normalize_header(alias);
                headers
                    .iter()
                    .find(|h| !used.contains(h.as_str()) && normalize_header(h) == wanted)
            });

            match hit {
                Some(header) => {
                    used.insert(header.as_str());
                    resolved.insert(spec.key, header.clone());
                }
                None if spec.required => missing_required.push(spec.label.to_string()),
                None => {}
            }
        }

        let unmapped_columns = headers
            .iter()
            .filter(|h| !used.contains(h.as_str()))
            .cloned()
            .collect();

        Self {
            record_type,
            resolved,
            missing_required,
            unmapped_columns,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required.is_empty()
    }

    /// 标准字段对应的源列名
    pub fn column(&self, key: FieldKey) -> Option<&str> {
        self.resolved.get(&key).map(|s| s.as_str())
    }

    /// 取单元格原始值（未映射或缺列时为 None）
    pub fn value<'a>(&self, row: &'a RawRow, key: FieldKey) -> Option<&'a Value> {
        self.column(key).and_then(|col| row.get(col))
    }

    /// 取文本值（去空白，空串视为 None；数值转为字符串）
    pub fn text(&self, row: &RawRow, key: FieldKey) -> Option<String> {
        let value = self.value(row, key)?;
        let text = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// 从行集合收集列名（按首次出现顺序）
pub fn collect_headers(rows: &[RawRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut headers = Vec::new();
    for row in rows {
        let mut keys: Vec<&String> = row.keys().collect();
        // HashMap 无序，同一行内按名称排序保证稳定
        keys.sort();
        for key in keys {
            if seen.insert(key.clone()) {
                headers.push(key.clone());
            }
        }
    }
    headers
}
