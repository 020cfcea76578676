pub mod datalogger; // TCP connection to the Solarman logger stick
pub mod packet; // vendor frame codec and register decoder
