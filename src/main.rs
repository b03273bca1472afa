use clap::{Parser, Subcommand};
use log::{info, warn};
use panmod::graph::PangenomeGraph;
use panmod::hist::Hist;
use panmod::io::{self, gfa::Gfa};
use panmod::matrix::ModuleMatrix;
use panmod::path::HaplotypePath;
use panmod::pca::{subsample_rows, PcaResult};
use panmod::plot::{hist_svg, scatter_svg, ScatterPoint, N_SHAPES};
use panmod::segment::{label_paths, label_table_tsv, ReferenceJump};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(version, about = "pangenome module presence/absence analysis")]
struct Opts {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Summarize nodes, links and paths of a GFA
    Stats {
        /// Input GFA filename (.gfa or .gfa.gz)
        gfa: PathBuf,
    },
    /// Detect the loop-back jump and write per-step segment labels
    Segment {
        /// Input GFA filename (.gfa or .gfa.gz)
        gfa: PathBuf,
        /// Name of the reference path used for jump detection.
        /// If not specified, the first P record is used.
        #[clap(long)]
        ref_path: Option<String>,
        /// Jump source node, overriding detection (requires --to)
        #[clap(long, requires = "to")]
        from: Option<usize>,
        /// Jump target node, overriding detection (requires --from)
        #[clap(long, requires = "from")]
        to: Option<usize>,
        /// Output label table TSV filename
        #[clap(short, long)]
        output: PathBuf,
    },
    /// Build the membership matrix, run PCA and render the figures
    Pca {
        /// Input GFA filename (.gfa or .gfa.gz)
        gfa: PathBuf,
        /// Name of the reference path used for jump detection.
        /// If not specified, the first P record is used.
        #[clap(long)]
        ref_path: Option<String>,
        /// Jump source node, overriding detection (requires --to)
        #[clap(long, requires = "to")]
        from: Option<usize>,
        /// Jump target node, overriding detection (requires --from)
        #[clap(long, requires = "from")]
        to: Option<usize>,
        /// Number of principal components
        #[clap(short = 'c', long, default_value_t = 2)]
        components: usize,
        /// Subsample the scatter to at most this many segments
        #[clap(long)]
        max_points: Option<usize>,
        /// Seed of the subsampling
        #[clap(long, default_value_t = 0)]
        seed: u64,
        /// Prefix of the output files (PREFIX.matrix.tsv, PREFIX.pca.json,
        /// PREFIX.scatter.svg, PREFIX.hist.svg, PREFIX.sizes.svg)
        #[clap(short, long)]
        output_prefix: PathBuf,
    },
}

fn main() -> std::io::Result<()> {
    env_logger::init();
    let opts: Opts = Opts::parse();
    println!("# started_at={}", chrono::Local::now());
    println!("# version={}", env!("CARGO_PKG_VERSION"));
    println!("# opts={:?}", opts);
    match opts.command {
        Commands::Stats { gfa } => stats(&gfa),
        Commands::Segment {
            gfa,
            ref_path,
            from,
            to,
            output,
        } => segment(&gfa, ref_path.as_deref(), from, to, &output),
        Commands::Pca {
            gfa,
            ref_path,
            from,
            to,
            components,
            max_points,
            seed,
            output_prefix,
        } => pca(
            &gfa,
            ref_path.as_deref(),
            from,
            to,
            components,
            max_points,
            seed,
            &output_prefix,
        ),
    }
}

fn input_error(msg: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, msg)
}

///
/// reference jump: explicit --from/--to, or detected on the (normalized)
/// reference path
///
fn resolve_jump(
    gfa: &Gfa,
    ref_path: Option<&str>,
    from: Option<usize>,
    to: Option<usize>,
) -> std::io::Result<ReferenceJump> {
    if let (Some(from), Some(to)) = (from, to) {
        return Ok(ReferenceJump::new(from, to));
    }
    let path = match ref_path {
        Some(name) => gfa
            .path(name)
            .ok_or_else(|| input_error(format!("reference path {} not found", name)))?,
        None => gfa
            .paths
            .first()
            .ok_or_else(|| input_error("input has no P records".to_string()))?,
    };
    let (path, _) = path.normalize();
    let jump = ReferenceJump::detect(&path)
        .ok_or_else(|| input_error(format!("reference path {} is too short", path.name)))?;
    info!("detected jump {} on {}", jump, path.name);
    Ok(jump)
}

fn normalized_paths(gfa: &Gfa) -> Vec<HaplotypePath> {
    gfa.paths
        .iter()
        .map(|p| {
            let (q, flipped) = p.normalize();
            if flipped {
                info!("flipped majority-reverse path {}", q.name);
            }
            q
        })
        .collect()
}

fn stats(gfa_file: &PathBuf) -> std::io::Result<()> {
    let gfa = Gfa::from_file(gfa_file)?;
    println!("n_nodes={}", gfa.n_nodes());
    println!("n_links={}", gfa.n_links());
    println!("n_paths={}", gfa.n_paths());
    println!("total_node_length={}", gfa.total_node_length());

    let graph = PangenomeGraph::from_gfa(&gfa);
    println!("degree_stats={:?}", graph.degree_stats());
    println!("n_ambiguous_nodes={}", graph.n_ambiguous_nodes());

    for path in &gfa.paths {
        let (_, flipped) = path.normalize();
        println!(
            "path\t{}\t{}\t{}\t{}",
            path.name,
            path.len(),
            path.n_reverse(),
            flipped
        );
    }
    Ok(())
}

fn segment(
    gfa_file: &PathBuf,
    ref_path: Option<&str>,
    from: Option<usize>,
    to: Option<usize>,
    output: &PathBuf,
) -> std::io::Result<()> {
    let gfa = Gfa::from_file(gfa_file)?;
    let jump = resolve_jump(&gfa, ref_path, from, to)?;
    println!("# jump={}", jump);
    let paths = normalized_paths(&gfa);
    let labeled = label_paths(&paths, jump);
    let n_module_steps = labeled.iter().filter(|s| s.label.is_module()).count();
    println!("n_steps={}", labeled.len());
    println!("n_module_steps={}", n_module_steps);
    io::write_string(output, &label_table_tsv(&labeled))
}

fn pca(
    gfa_file: &PathBuf,
    ref_path: Option<&str>,
    from: Option<usize>,
    to: Option<usize>,
    components: usize,
    max_points: Option<usize>,
    seed: u64,
    prefix: &PathBuf,
) -> std::io::Result<()> {
    let gfa = Gfa::from_file(gfa_file)?;
    let jump = resolve_jump(&gfa, ref_path, from, to)?;
    println!("# jump={}", jump);
    let paths = normalized_paths(&gfa);
    let labeled = label_paths(&paths, jump);
    let matrix = ModuleMatrix::build(&labeled);
    println!("n_segments={}", matrix.n_rows());
    println!("n_module_nodes={}", matrix.n_columns());

    let prefix = prefix.display();
    io::write_string(format!("{}.matrix.tsv", prefix), &matrix.to_tsv())?;

    // modules per haplotype, zero-module paths included
    let mut per_path: HashMap<&str, usize> = paths.iter().map(|p| (p.name.as_str(), 0)).collect();
    for key in &matrix.rows {
        *per_path.entry(key.path.as_str()).or_insert(0) += 1;
    }
    let counts: Vec<usize> = per_path.values().copied().collect();
    let hist = Hist::from(&counts);
    println!("modules_per_path={}", hist);
    io::write_string(
        format!("{}.hist.svg", prefix),
        &hist_svg(&hist, "modules per haplotype"),
    )?;

    let sizes = matrix.size_hist();
    println!("segment_sizes={}", sizes);
    io::write_string(
        format!("{}.sizes.svg", prefix),
        &hist_svg(&sizes, "nodes per module segment"),
    )?;

    let result = match PcaResult::from_matrix(&matrix, jump, components) {
        Some(result) => result,
        None => {
            warn!(
                "skipping PCA: {} module segments is not enough",
                matrix.n_rows()
            );
            return Ok(());
        }
    };
    println!("explained={:?}", result.explained);
    io::write_string(format!("{}.pca.json", prefix), &result.to_json())?;

    // vary the marker per path only while shapes stay distinguishable
    let mut path_shape: HashMap<&str, usize> = HashMap::new();
    for key in &result.rows {
        let next = path_shape.len();
        path_shape.entry(key.path.as_str()).or_insert(next);
    }
    let vary_shape = path_shape.len() <= N_SHAPES;

    let shown = subsample_rows(
        result.rows.len(),
        max_points.unwrap_or(result.rows.len()),
        seed,
    );
    let points: Vec<ScatterPoint> = shown
        .into_iter()
        .map(|i| ScatterPoint {
            x: result.scores[i][0],
            y: if result.scores[i].len() > 1 {
                result.scores[i][1]
            } else {
                0.0
            },
            group: result.groups[i],
            shape: if vary_shape {
                path_shape[result.rows[i].path.as_str()]
            } else {
                0
            },
            name: format!("{}/module-{}", result.rows[i].path, result.rows[i].module),
        })
        .collect();
    io::write_string(
        format!("{}.scatter.svg", prefix),
        &scatter_svg(&points, "PC1", "PC2"),
    )?;
    Ok(())
}
