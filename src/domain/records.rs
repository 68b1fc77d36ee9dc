// ==========================================
// 供应链洞察 - 源数据记录模型
// ==========================================
// 用途: 导入层写入，指标层只读
// 对齐: inventory_record / sales_record 表
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 上传通道交付的原始行（列名 → 松散类型值）
pub type RawRow = HashMap<String, serde_json::Value>;

// ==========================================
// InventoryRecord - 月度库存快照
// ==========================================
// 自然键: (product_code, period)
// 红线: 余额与成本解析后非负（无法解析的数值替换为 0）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    // ===== 自然键 =====
    pub product_code: String,
    pub period: NaiveDate, // 月末日期

    // ===== 基础信息 =====
    pub name: String,
    pub group: Option<String>,
    pub subgroup: Option<String>,
    pub unit_type: Option<String>,

    // ===== 数量 =====
    pub previous_balance: f64, // 期初余额
    pub entries: f64,          // 本期入库
    pub exits: f64,            // 本期出库
    pub current_balance: f64,  // 期末余额

    // ===== 成本 =====
    pub average_cost: f64,
    pub last_cost: f64,
}

impl InventoryRecord {
    /// 自然键
    pub fn natural_key(&self) -> (String, NaiveDate) {
        (self.product_code.clone(), self.period)
    }

    /// 账面推算余额（期初 + 入库 - 出库）
    pub fn computed_balance(&self) -> f64 {
        self.previous_balance + self.entries - self.exits
    }
}

// ==========================================
// SalesRecord - 销售明细
// ==========================================
// 客户/区域字段仅用于汇总，不参与核心指标
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub product_code: String,
    pub document_date: NaiveDate,
    pub document_number: Option<String>,
    pub quantity: f64,
    pub net_value: f64,
    pub gross_value: f64,
    pub discount: f64,

    // ===== 汇总维度 =====
    pub customer: Option<String>,
    pub territory: Option<String>,
    pub salesperson: Option<String>,
}

impl SalesRecord {
    /// 数量为 0 的记录不参与月均销量计算
    pub fn counts_toward_average(&self) -> bool {
        self.quantity != 0.0
    }
}
