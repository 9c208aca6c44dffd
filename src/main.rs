use std::{collections::HashMap, fs::File, sync::Arc, thread, time::Instant};

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{info, trace, warn};
use memmap2::MmapOptions;

mod args;
use args::CliOptions;

mod artifacts;
use artifacts::corpus::Corpus;

mod driver;
mod icons;
mod record;
use record::{ArtifactKind, Classification, Record};

mod report;
mod scanner;
mod walker;

fn main() -> anyhow::Result<()> {
    // harvest cli arguments
    let opts = CliOptions::new()?;
    trace!("args: {:?}", opts);
    let now = Instant::now();

    if !opts.input_file.exists() {
        anyhow::bail!("input file {} does not exist", opts.input_file.display());
    }

    // open dump and build mmap
    let file = File::open(&opts.input_file)?;
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    let mmap = Arc::new(mmap);

    // build the corpus and optionally retain only the kinds passed on the cli
    let mut corpus = Corpus::new();
    corpus.retain(&opts.kinds);
    let corpus = Arc::new(corpus);

    let records = if opts.nb_threads <= 1 {
        // sequential: the lazy carving iterator does scan and walk in one go
        driver::carve(&mmap, &corpus)?.collect()
    } else {
        carve_parallel(&opts, &mmap, &corpus)?
    };

    // hand base64 favicons from tab session data to the icon extractor
    if !opts.no_icons {
        let icons_dir = opts.output_dir.join("favicons");
        for record in records.iter().filter(|r| r.kind == ArtifactKind::TabSession) {
            if let Err(e) = icons::extract_icon(record.value("favicon_url"), record.offset, &icons_dir)
            {
                warn!("favicon at offset {} not saved: {}", record.offset, e);
            }
        }
    }

    report::write_reports(&records, &corpus, &opts.output_dir)?;

    // print out statistics
    let mut counts: HashMap<ArtifactKind, (usize, usize)> = HashMap::new();
    for record in &records {
        let entry = counts.entry(record.kind).or_default();
        match record.classification {
            Classification::Complete => entry.0 += 1,
            Classification::PartiallyCarved => entry.1 += 1,
        }
    }
    for artifact in corpus.iter() {
        let (complete, partial) = counts.get(&artifact.kind).copied().unwrap_or_default();
        println!(
            "{}: {} carved, {} partially carved",
            artifact.kind, complete, partial
        );
    }

    let elapsed = now.elapsed();
    println!("total records: {}, total time: {:?}", records.len(), elapsed);

    Ok(())
}

// scan once on the main thread, then split the match list into contiguous
// runs, one per worker; concatenating the per-thread results in thread order
// keeps the final records ascending by offset
fn carve_parallel(
    opts: &CliOptions,
    mmap: &Arc<memmap2::Mmap>,
    corpus: &Arc<Corpus>,
) -> anyhow::Result<Vec<Record>> {
    // single linear pass over the whole dump with the combined automaton
    let ac = corpus.automaton()?;
    let matches = scanner::scan(mmap, &ac);
    info!(
        "{} signature matches in {} bytes",
        matches.len(),
        mmap.len()
    );

    // create a MultiProgress object to manage multiple progress bars
    let multi_progress = Arc::new(MultiProgress::new());

    let chunk_size = matches.len().div_ceil(opts.nb_threads).max(1);

    let mut handles = vec![];
    for (i, chunk) in matches.chunks(chunk_size).enumerate() {
        // clone what is needed
        let chunk = chunk.to_vec();
        let mmap_clone = Arc::clone(mmap);
        let corpus_clone = Arc::clone(corpus);
        let multi_progress_clone = Arc::clone(&multi_progress);
        let with_pb = opts.progress_bar;

        // spawn thread
        let handle = thread::spawn(move || -> Vec<Record> {
            info!("starting thread {}", i);

            let pb = if with_pb {
                multi_pbar(&multi_progress_clone, chunk.len(), i)
            } else {
                ProgressBar::hidden()
            };
            pb.set_message("Walking matches............");

            let mut records = Vec::new();
            for m in chunk {
                if let Some(record) = driver::walk_match(&mmap_clone, &corpus_clone, m) {
                    records.push(record);
                }
                pb.inc(1);
            }

            // end of thread
            pb.set_message(format!("thread finished, {} records carved", records.len()));
            pb.finish();

            records
        });

        handles.push(handle);
    }

    // wait for all threads to complete, in thread index order
    let mut records = Vec::new();
    for (thread_id, handle) in handles.into_iter().enumerate() {
        match handle.join() {
            Ok(carved) => records.extend(carved),
            Err(_) => warn!("Thread {} panicked!", thread_id),
        }
    }

    Ok(records)
}

// define multi-progress bars, one for each thread
fn multi_pbar(mp: &Arc<MultiProgress>, length: usize, thread_number: usize) -> ProgressBar {
    let pb = mp.add(ProgressBar::new(length as u64));

    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{msg}] {bar:40.cyan/blue} {pos}/{len} ({eta})")
            .unwrap(),
    );

    pb.set_message(format!("Thread {}", thread_number + 1));

    pb
}
