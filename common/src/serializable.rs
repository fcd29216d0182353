use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// JSON persistence for the artifacts exchanged with the WHIR prover.
pub trait JsonFile {
    fn write_json(&self, path: &Path) -> Result<(), std::io::Error>;
    fn read_json(path: &Path) -> Result<Self, std::io::Error>
    where
        Self: Sized;
}

impl<T> JsonFile for T
where
    T: serde::Serialize + serde::de::DeserializeOwned,
{
    fn write_json(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()
    }

    fn read_json(path: &Path) -> Result<Self, std::io::Error> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}
