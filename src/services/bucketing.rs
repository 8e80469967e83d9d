//! Department attribution for report items
//!
//! Most items count toward the report's own department. CAD/CAM work is
//! pulled into the CAD/CAM department wherever it was entered, with two
//! exceptions: the model department's CAD model items, and anything entered
//! by the denture department (whose CAD items are its own production).

use crate::types::Department;

/// CAD/CAM design, always attributed to CAD/CAM
pub const CAD_CAM_DESIGN: &str = "CAD/CAM(設計)";
/// CAD/CAM completion, always attributed to CAD/CAM
pub const CAD_CAM_FINISH: &str = "CAD/CAM(完成)";
/// Substring that marks an item as CAD work
pub const CAD_MARKER: &str = "CAD";
/// Model-department CAD items that stay with their own department
pub const MODEL_CAD_EXCEPTIONS: [&str; 2] = [
    "ノーマル模型【CAD】(総製作)",
    "貼り付け模型【CAD】(総製作)",
];

/// Department whose totals an item counts toward.
///
/// Every aggregation path (dashboard breakdown, monthly matrix) goes through
/// this function so the views cannot disagree.
pub fn target_department(report_department: Department, item_name: &str) -> Department {
    if item_name == CAD_CAM_DESIGN || item_name == CAD_CAM_FINISH {
        return Department::CadCam;
    }

    let is_cad = item_name.contains(CAD_MARKER);
    let is_model_exception = MODEL_CAD_EXCEPTIONS.contains(&item_name);
    let is_denture = report_department == Department::Denture;

    if is_cad && !is_model_exception && !is_denture {
        Department::CadCam
    } else {
        report_department
    }
}
