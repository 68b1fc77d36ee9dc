// ==========================================
// 供应链洞察 - 交货期估算
// ==========================================
// 按商品组名片段匹配（不区分大小写），首个命中生效，否则取默认值
// ==========================================

/// 默认交货期（天）
pub const DEFAULT_LEAD_TIME_DAYS: u32 = 14;

// 片段按顺序匹配：进口优先于品类
const GROUP_OVERRIDES: &[(&str, u32)] = &[
    ("import", 35),
    ("textil", 30),
    ("repuesto", 28),
    ("spare", 28),
    ("electr", 21),
    ("quimic", 21),
    ("chemical", 21),
    ("farma", 10),
    ("medic", 10),
    ("aliment", 7),
    ("perecedero", 7),
    ("food", 7),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadTimeTable {
    default_days: u32,
}

impl LeadTimeTable {
    pub fn new(default_days: u32) -> Self {
        Self { default_days }
    }

    pub fn default_days(&self) -> u32 {
        self.default_days
    }

    pub fn lookup(&self, group: Option<&str>) -> u32 {
        let Some(group) = group else {
            return self.default_days;
        };
        let group = group.to_lowercase();
        GROUP_OVERRIDES
            .iter()
            .find(|(fragment, _)| group.contains(fragment))
            .map(|(_, days)| *days)
            .unwrap_or(self.default_days)
    }
}

impl Default for LeadTimeTable {
    fn default() -> Self {
        Self::new(DEFAULT_LEAD_TIME_DAYS)
    }
}
