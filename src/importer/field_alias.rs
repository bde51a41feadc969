// ==========================================
// 学员名册导入系统 - 表头别名表与匹配器
// ==========================================
// 职责: 源表头 → 标准字段（纯函数，无副作用）
// 说明: 新增别名只改下表，不改匹配逻辑
// ==========================================

use crate::domain::types::CanonicalField;

// ==========================================
// 别名表
// ==========================================
// 比较前两侧都会经过 normalize_header，此处写法只求可读

const FIRST_NAME_ALIASES: &[&str] = &[
    "First Name",
    "First Names",
    "Learner First Name",
    "Learner Name",
    "Student First Name",
    "Pupil First Name",
    "Child First Name",
    "Given Name",
    "Given Names",
    "Forename",
    "Forenames",
    "Name",
    "名字",
    "名",
];

const LAST_NAME_ALIASES: &[&str] = &[
    "Last Name",
    "Surname",
    "Learner Surname",
    "Learner Last Name",
    "Student Surname",
    "Student Last Name",
    "Pupil Surname",
    "Child Surname",
    "Family Name",
    "姓氏",
    "姓",
];

const GENDER_ALIASES: &[&str] = &[
    "Gender",
    "Sex",
    "Learner Gender",
    "Student Gender",
    "Gender (M/F)",
    "性别",
];

const CELL_PHONE_ALIASES: &[&str] = &[
    "Cell Phone",
    "Cell",
    "Cell No",
    "Cell Number",
    "Mobile",
    "Mobile No",
    "Mobile Number",
    "Mobile Phone",
    "Phone",
    "Phone Number",
    "Contact Number",
    "Parent Cell",
    "Tel Cell",
    "手机",
    "手机号",
];

const TEL_HOME_ALIASES: &[&str] = &[
    "Tel Home",
    "Tel (H)",
    "Home Tel",
    "Home Phone",
    "Home Number",
    "Telephone Home",
    "Home Telephone",
    "家庭电话",
];

const TEL_EMERGENCY_ALIASES: &[&str] = &[
    "Tel Emergency",
    "Tel (E)",
    "Emergency Tel",
    "Emergency Phone",
    "Emergency Number",
    "Emergency Contact",
    "Emergency Contact Number",
    "紧急电话",
];

const WHATSAPP_ALIASES: &[&str] = &[
    "WhatsApp",
    "WhatsApp Number",
    "WhatsApp No",
    "Whats App",
    "WA Number",
];

const TELEGRAM_ALIASES: &[&str] = &["Telegram", "Telegram Number", "Telegram Handle", "Telegram Username"];

const ACCESSION_NUMBER_ALIASES: &[&str] = &[
    "Accession Number",
    "Accession No",
    "Admission Number",
    "Admission No",
    "Learner Number",
    "Learner No",
    "Learner ID",
    "Student Number",
    "Student ID",
    "Enrolment Number",
    "Enrollment Number",
    "学号",
];

impl CanonicalField {
    /// 该字段可接受的表头写法
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::FirstName => FIRST_NAME_ALIASES,
            CanonicalField::LastName => LAST_NAME_ALIASES,
            CanonicalField::Gender => GENDER_ALIASES,
            CanonicalField::CellPhone => CELL_PHONE_ALIASES,
            CanonicalField::TelHome => TEL_HOME_ALIASES,
            CanonicalField::TelEmergency => TEL_EMERGENCY_ALIASES,
            CanonicalField::Whatsapp => WHATSAPP_ALIASES,
            CanonicalField::Telegram => TELEGRAM_ALIASES,
            CanonicalField::AccessionNumber => ACCESSION_NUMBER_ALIASES,
        }
    }

    /// 原始表头是否为该字段的别名
    pub fn matches_header(self, raw_header: &str) -> bool {
        matches(raw_header, self.aliases())
    }
}

// ==========================================
// 匹配器
// ==========================================

/// 表头归一化: 小写，去掉空白/下划线/连字符/换行
pub fn normalize_header(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// 原始表头归一化后与任一别名归一化后相等
pub fn matches(raw_header: &str, aliases: &[&str]) -> bool {
    let key = normalize_header(raw_header);
    if key.is_empty() {
        return false;
    }
    aliases.iter().any(|alias| normalize_header(alias) == key)
}

/// 识别表头对应的第一个标准字段
pub fn field_for_header(raw_header: &str) -> Option<CanonicalField> {
    CanonicalField::ALL
        .iter()
        .copied()
        .find(|field| field.matches_header(raw_header))
}
