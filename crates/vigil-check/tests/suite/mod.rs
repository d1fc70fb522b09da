mod patch;
mod scan;
