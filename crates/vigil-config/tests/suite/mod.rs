mod discovery;
mod options;
mod logging;
