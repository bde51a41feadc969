// ==========================================
// 学员名册导入系统 - 配置层
// ==========================================
// 职责: 导入与提交参数管理,支持多级覆写
// 来源: JSON 配置文件 + ROSTER_IMPORT_* 环境变量
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use import_config_trait::ImportConfigReader;
