//! # convert 命令实现
//!
//! phonopy.yaml (+ HDF5) → euphonic JSON 的单次转换。
//!
//! ## 功能
//! - 定位伴随的 `<seedname>-force_constants.hdf5`
//! - 读取 phonopy 模型
//! - 索引映射、相位约定变换、组装 euphonic 模型
//! - 写出 JSON（已存在则覆盖）
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `parsers/`, `converters/`, `models/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`

use crate::cli::convert::ConvertArgs;
use crate::converters::{self, CellPhaseTransform, PhaseTransform};
use crate::error::{ConvertError, Result};
use crate::models::{ForceConstants, PhonopyModel};
use crate::parsers::{locate, EuphonicJsonWriter, ModelLoader, ModelWriter, PhonopyYamlLoader};
use crate::utils::{output, progress};

use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 原胞原子表格行
#[derive(Debug, Clone, Tabled)]
struct AtomRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "Mass (amu)")]
    mass: String,
    #[tabled(rename = "Fractional position")]
    position: String,
}

/// 执行转换
pub fn execute(args: ConvertArgs) -> Result<()> {
    output::set_quiet(args.quiet);
    output::print_header("Converting phonopy force constants to euphonic");

    for (name, value) in [
        ("--symprec", args.symprec),
        ("--cell-origins-tol", args.cell_origins_tol),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(ConvertError::InvalidArgument(format!(
                "{} must be a positive finite number, got {}",
                name, value
            )));
        }
    }

    let input = args.input_path();
    let fc_file = resolve_fc_file(&input, args.force_constants.as_deref())?;

    output::print_info(&format!("Reading {}", input.display()));
    match &fc_file {
        Some(path) => output::print_info(&format!("Force constants from {}", path.display())),
        None => output::print_info("Force constants embedded in the phonopy.yaml"),
    }

    let loader = PhonopyYamlLoader {
        symprec: args.symprec,
        ..Default::default()
    };
    let transform = CellPhaseTransform {
        cell_origins_tol: args.cell_origins_tol,
    };

    let fc = convert_file(
        &loader,
        &transform,
        &EuphonicJsonWriter,
        &input,
        fc_file.as_deref(),
        &args.output_json,
        &print_model_summary,
    )?;

    output::print_done(&format!(
        "Wrote {} cells x {} atoms to '{}'",
        fc.n_cells_in_sc(),
        fc.crystal.n_atoms(),
        args.output_json.display()
    ));

    Ok(())
}

/// 完整流水线：读取 → 转换 → 写出
///
/// `on_loaded` 在模型读入后、转换前调用（用于打印摘要）。
pub fn convert_file(
    loader: &dyn ModelLoader,
    transform: &dyn PhaseTransform,
    writer: &dyn ModelWriter,
    input: &Path,
    fc_file: Option<&Path>,
    output_path: &Path,
    on_loaded: &dyn Fn(&PhonopyModel),
) -> Result<ForceConstants> {
    let model = loader.load(input, fc_file)?;
    on_loaded(&model);
    let fc = convert_model(&model, transform)?;
    writer.write(&fc, output_path)?;
    Ok(fc)
}

/// 显式指定的力常数文件优先，否则按命名约定查找
fn resolve_fc_file(input: &Path, explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) if !path.exists() => Err(ConvertError::FileNotFound {
            path: path.display().to_string(),
        }),
        Some(path) => Ok(Some(path.to_path_buf())),
        None => Ok(locate::find_companion_fc(input)),
    }
}

fn convert_model(model: &PhonopyModel, transform: &dyn PhaseTransform) -> Result<ForceConstants> {
    let spinner = progress::create_spinner("Converting force constant phases");
    let result = converters::phonopy_to_euphonic(model, transform);
    spinner.finish_and_clear();
    result
}

fn print_model_summary(model: &PhonopyModel) {
    let prim = &model.primitive;
    let (a, b, c, alpha, beta, gamma) = prim.lattice.parameters();

    output::print_info(&format!(
        "Primitive cell {} ({} atoms), supercell {} atoms",
        prim.formula(),
        prim.num_atoms(),
        model.supercell.num_atoms()
    ));
    if let Some(unit_cell) = &model.unit_cell {
        output::print_info(&format!(
            "Unit cell {} ({} atoms)",
            unit_cell.formula(),
            unit_cell.num_atoms()
        ));
    }
    output::print_info(&format!(
        "a={:.4} b={:.4} c={:.4} Å  α={:.2} β={:.2} γ={:.2}°  V={:.4} Å³",
        a,
        b,
        c,
        alpha,
        beta,
        gamma,
        prim.lattice.volume().abs()
    ));
    output::print_info(&format!(
        "Supercell matrix {:?}, force constants {} ({} x {})",
        model.supercell_matrix,
        if model.force_constants.is_compact() { "compact" } else { "full" },
        model.force_constants.n_rows,
        model.force_constants.n_cols
    ));
    if model.source_units != Default::default() {
        output::print_warning(&format!(
            "Converting from {} / {} / {} to angstrom / amu / eV/angstrom^2",
            model.source_units.length,
            model.source_units.atomic_mass,
            model.source_units.force_constants
        ));
    }

    let rows: Vec<AtomRow> = prim
        .symbols
        .iter()
        .zip(&prim.masses)
        .zip(&prim.positions)
        .enumerate()
        .map(|(i, ((symbol, mass), pos))| AtomRow {
            index: i + 1,
            species: symbol.clone(),
            mass: format!("{:.4}", mass),
            position: format!("{:10.6} {:10.6} {:10.6}", pos[0], pos[1], pos[2]),
        })
        .collect();
    output::print_table(&Table::new(rows).to_string());
}
