//! ui::help
//!
//! Help texts printed by `run --help`, `run biocontainers` and `run --list`.

use std::collections::BTreeSet;

use super::output::format_list;

pub const RUN_HELP: &str = "\
Run a bioinformatics module as a cloud batch job or a local container.

USAGE:
    bioshed run [OPTIONS] <MODULE> [ARGS]...
    bioshed runlocal [OPTIONS] <MODULE> [ARGS]...

OPTIONS:
    --local                  Run in a local container instead of the cloud
    --inputdir <DIR>         Mount DIR at /input/ (implies --local)
    --aws-env-file <FILE>    Pass FILE to the container as its environment
    -u <USER>                Run the container as USER
    --help                   Show this help

SPECIAL FORMS:
    bioshed run --list                     List available modules
    bioshed run <MODULE> --help            Show the module's own help
    bioshed run <MODULE> --example         Run the module's bundled example
    bioshed run biocontainers <IMAGE[:TAG]> [ARGS]...

Runs go to the cloud when a provider is configured and its batch
infrastructure is deployed; otherwise they run locally.

EXAMPLES:
    bioshed run fastqc -h
    bioshed run --inputdir ./reads fastqc /input/sample.fq
    bioshed run bwa mem s3://bucket/ref.fa s3://bucket/reads.fq";

pub const BIOCONTAINERS_HELP: &str = "\
Run any image from the public biocontainers registry (public.ecr.aws/biocontainers).

USAGE:
    bioshed run biocontainers <IMAGE[:TAG]> [ARGS]...

The tag defaults to 'latest'. Biocontainers always run locally. The working
directory, or --inputdir when given, is mounted at /data/.

EXAMPLES:
    bioshed run biocontainers samtools:1.9 view -h /data/sample.bam
    bioshed run --inputdir ./bams biocontainers samtools view -H /data/a.bam";

/// Listing printed by `run --list`.
pub fn module_listing(modules: &BTreeSet<String>) -> String {
    let mut text = String::from("Use \"bioshed run\" to run one of the modules below:\n\n");
    if !modules.is_empty() {
        text.push_str(&format_list(modules, "\t"));
        text.push('\n');
    }
    text.push_str("\nType \"bioshed run --help\" for full documentation.");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_is_sorted() {
        let modules: BTreeSet<String> = ["samtools", "bwa"].iter().map(|s| s.to_string()).collect();
        let text = module_listing(&modules);
        let bwa = text.find("\tbwa").unwrap();
        let samtools = text.find("\tsamtools").unwrap();
        assert!(bwa < samtools);
    }

    #[test]
    fn texts_mention_their_forms() {
        assert!(RUN_HELP.contains("--inputdir"));
        assert!(BIOCONTAINERS_HELP.contains("/data/"));
    }
}
