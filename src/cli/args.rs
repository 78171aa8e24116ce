// args.rs - Command line arguments definition

use argh::FromArgs;
use crate::remote::templates::DEFAULT_N_TEMPLATES;

#[derive(FromArgs)]
/// af2state - State-biased template and MSA preparation for AlphaFold2
pub struct Args {
    /// query amino-acid sequence
    #[argh(option)]
    pub sequence: Option<String>,

    /// FASTA file with the query sequence (first record is used)
    #[argh(option)]
    pub fasta: Option<String>,

    /// job label; a 5-character sequence hash is appended (default: FASTA id or "job")
    #[argh(option)]
    pub job: Option<String>,

    /// directory in which the <job>_env directory is created (default: .)
    #[argh(option)]
    pub output_dir: Option<String>,

    /// template state: one GPCR state (Active, Inactive, Intermediate, "G protein", Arrestin),
    /// three kinase values (DFG, αC helix, salt bridge) or template ids like 3sn6_R; repeatable
    #[argh(option)]
    pub state: Vec<String>,

    /// PDB code to leave out of annotation-based selection; repeatable
    #[argh(option)]
    pub exclude: Vec<String>,

    /// maximum number of templates passed to the predictor (default: 20)
    #[argh(option, default = "DEFAULT_N_TEMPLATES")]
    pub n_templates: usize,

    /// shuffle templates before applying --n-templates
    #[argh(switch)]
    pub shuffle_templates: bool,

    /// reshuffle and re-download the templates recorded by a previous run instead of searching again
    #[argh(switch)]
    pub shuffle_only: bool,

    /// MMseqs2 MSA server URL
    #[argh(option)]
    pub host_url: Option<String>,

    /// MMseqs2 template server URL
    #[argh(option)]
    pub template_url: Option<String>,

    /// GPCRdb structure service URL
    #[argh(option)]
    pub gpcrdb_url: Option<String>,

    /// KLIFS API URL
    #[argh(option)]
    pub klifs_url: Option<String>,

    /// base delay between MMseqs2 requests in seconds (default: 5)
    #[argh(option, default = "5")]
    pub poll_interval: u64,

    /// maximum random extra delay between MMseqs2 requests in seconds (default: 5)
    #[argh(option, default = "5")]
    pub poll_jitter: u64,

    /// give up after this many MMseqs2 requests (default: wait forever)
    #[argh(option)]
    pub max_polls: Option<usize>,

    /// HTTP request timeout in seconds (default: 300)
    #[argh(option, default = "300")]
    pub timeout: u64,

    /// annotation cache file (.lz4) reused across runs
    #[argh(option)]
    pub annotation_cache: Option<String>,

    /// user note to save with the annotation cache
    #[argh(option)]
    pub cache_note: Option<String>,

    /// ignore cached annotations and query the services again
    #[argh(switch)]
    pub refresh_annotations: bool,

    /// randomly subsample the MSA to at most this many sequences (query always kept)
    #[argh(option)]
    pub msa_max_seqs: Option<usize>,

    /// seed for MSA subsampling (default: 0)
    #[argh(option, default = "0")]
    pub msa_seed: u64,

    /// MSA column substitution, e.g. A123W or 123W; repeatable
    #[argh(option)]
    pub mutate: Vec<String>,

    /// model index 1-5 of the AlphaFold2 parameters (default: 1)
    #[argh(option, default = "1")]
    pub model: u8,

    /// maximum number of MSA clusters (default: network default)
    #[argh(option)]
    pub max_msa_clusters: Option<usize>,

    /// maximum number of extra MSA sequences (default: network default)
    #[argh(option)]
    pub max_extra_msa: Option<usize>,

    /// number of recycles (default: 3)
    #[argh(option, default = "3")]
    pub num_recycles: usize,

    /// structure module iterations (default: 8)
    #[argh(option, default = "8")]
    pub structure_module_repeats: usize,

    /// use the non-pTM model parameters
    #[argh(switch)]
    pub no_ptm: bool,

    /// command that runs the predictor; the request manifest path is appended
    #[argh(option)]
    pub predictor_cmd: Option<String>,

    /// validate inputs without any network access
    #[argh(switch)]
    pub dry_run: bool,

    /// path to TOML configuration file
    #[argh(option)]
    pub config: Option<String>,

    /// generate sample configuration file and exit
    #[argh(switch)]
    pub generate_config: bool,
}
