
// struct to handle line-oriented file buffers


use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use log::debug;

pub struct FileBufferHelper<'a> {
    pub path: &'a Path,
    pub buffer_reader: BufReader<File>,
    pub line: String,
    pub line_number: usize,
}

impl<'a> FileBufferHelper<'a> {
    pub fn new(file: &'a Path) -> io::Result<FileBufferHelper<'a>> {
        // initialise instance of FileBufferHelper
        debug!("FileHelper created for: {:?}", file);
        let file_open = File::open(file)?;
        Ok(Self {
            path: file,
            buffer_reader: BufReader::new(file_open),
            line: String::new(),
            line_number: 0,
        })
    }

    pub fn read_next(&mut self) -> io::Result<bool> {
        // replace `line` with the next line, terminator stripped
        // false once the end of the file is reached
        self.line.clear();
        if self.buffer_reader.read_line(&mut self.line)? == 0 {
            return Ok(false);
        }
        let trimmed_len = self.line.trim_end_matches(['\n', '\r']).len();
        self.line.truncate(trimmed_len);
        self.line_number += 1;
        Ok(true)
    }
}
