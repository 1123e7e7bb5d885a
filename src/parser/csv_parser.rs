use crate::models::{RawContractRow, SourceRow};
use std::fs::File;
use std::io::BufReader;
use tokio::sync::mpsc::Sender;
use tracing::{error, info};

const READ_LOG_EVERY: u64 = 100_000;

//Streams the export into the engine. The bounded channel is the pacing
//mechanism: while the engine commits a batch, send() blocks, so at most one
//batch plus the channel buffer is ever in memory.
pub struct CsvParser {
    path: String,
    tx: Sender<SourceRow>,
    //rows at or before this offset were committed by a previous run; they are
    //still decoded but never sent
    resume_offset: u64,
}

impl CsvParser {
    pub fn new(path: String, tx: Sender<SourceRow>, resume_offset: u64) -> Self {
        Self {
            path,
            tx,
            resume_offset,
        }
    }

    pub async fn run(&mut self) {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to open csv file: {e:?}");
                return;
            }
        };

        //1 MiB buffer; the export lines are long
        let reader = BufReader::with_capacity(1 << 20, file);
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        if self.resume_offset > 0 {
            info!(
                "Resuming: discarding rows at or before offset {}",
                self.resume_offset
            );
        }

        let mut row_number: u64 = 0;
        for result in rdr.deserialize::<RawContractRow>() {
            row_number += 1;
            if row_number % READ_LOG_EVERY == 0 {
                info!("Read {row_number} rows");
            }
            match result {
                Ok(record) => {
                    if row_number <= self.resume_offset {
                        continue;
                    }
                    let row = SourceRow {
                        number: row_number,
                        record,
                    };
                    if self.tx.send(row).await.is_err() {
                        //engine is gone (shutdown); stop reading
                        return;
                    }
                }
                Err(e) => error!("Failed to parse row {row_number}: {e}"),
            }
        }
    }
}
