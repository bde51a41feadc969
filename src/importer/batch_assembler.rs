// ==========================================
// 学员名册导入系统 - 批次汇总器
// ==========================================
// 阶段 4: 逐行结果 → 计数 / 错误列表 / 警告列表 / 预览 / 待提交列表
// 说明: 不查询已有记录，duplicate_rows 由提交结果回填
// ==========================================

use crate::domain::roster::{BatchSummary, ValidationOutcome, PREVIEW_LIMIT};

/// 汇总逐行校验结果（输入须为原始行序，空行已被跳过）
pub fn assemble(outcomes: Vec<ValidationOutcome>) -> BatchSummary {
    let mut summary = BatchSummary {
        total_rows: outcomes.len(),
        ..BatchSummary::default()
    };

    for outcome in outcomes {
        let ready = outcome.is_ready();
        let ValidationOutcome {
            record,
            errors,
            warnings,
            ..
        } = outcome;

        summary.errors.extend(errors);
        summary.warnings.extend(warnings);

        if ready {
            summary.valid_rows += 1;
            if summary.preview.len() < PREVIEW_LIMIT {
                summary.preview.push(record.clone());
            }
            summary.ready_records.push(record);
        } else {
            summary.invalid_rows += 1;
        }
    }

    summary
}
