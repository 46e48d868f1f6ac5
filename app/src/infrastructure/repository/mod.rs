mod catalog;
mod job;
