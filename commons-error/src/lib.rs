use log::*;

//
// Encapsulation for the logger routines
//
// Every macro appends the calling file and line so the log4rs output
// stays readable without a backtrace.
//

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        info!("[{}:{}] {}",  file!(), line!(), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        debug!("[{}:{}] {}",  file!(), line!(), format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        error!("{} [{}:{}]", format!($($arg)*), file!(), line!());
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        warn!("{} [{}:{}]", format!($($arg)*), file!(), line!());
    };
}

#[macro_export]
macro_rules! tr_fwd {
    () => {
        err_closure_fwd(format!("[{}:{}]", file!(), line!()).as_str())
    };
}

#[macro_export]
macro_rules! err_fwd {
    ($($arg:tt)*) => {
        err_closure_fwd(format!("{} [{}:{}]", format!($($arg)*).as_str(), file!(), line!()).as_str())
    };
}

/// Same as err_fwd but prints on stderr. For command line tools where
/// log4rs is not necessarily configured.
#[macro_export]
macro_rules! eprint_fwd {
    ($($arg:tt)*) => {
        eprint_closure_fwd(format!("{} [{}:{}]", format!($($arg)*).as_str(), file!(), line!()).as_str())
    };
}

pub fn err_closure_fwd<'a, T: std::fmt::Display>(msg : &'a str) -> Box<dyn Fn(T) -> T + 'a>
{
    let lambda = move |e : T | {
        log_error!("[{}] - {}", e, msg);
        e
    };
    Box::new(lambda)
}

pub fn eprint_closure_fwd<'a, T: std::fmt::Display>(msg : &'a str) -> Box<dyn Fn(T) -> T + 'a>
{
    let lambda = move |e : T | {
        eprintln!("💣 {} - [{}]", msg, e);
        e
    };
    Box::new(lambda)
}

///
/// cargo test -- --nocapture --test-threads=1
///
#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::env;
    use std::fs::File;
    use std::path::Path;
    use std::sync::Once;
    use crate::*;

    static INIT: Once = Once::new();

    fn init() {
        INIT.call_once(|| {
            // Without the env var the macros still run, the records simply go nowhere.
            if let Ok(atelier_env) = env::var("ATELIER_ENV") {
                let log_config: String = format!("{}/commons-error/config/log4rs.yaml", atelier_env);
                let log_config_path = Path::new(&log_config);
                if let Err(e) = log4rs::init_file(&log_config_path, Default::default()) {
                    eprintln!("log config path : {:?} {:?}", &log_config_path, e);
                }
            }
        });
    }

    fn open_file_with_err() -> anyhow::Result<()> {
        let filename = "no_such_listing.json";
        let _f = File::open(filename).map_err(
            err_fwd!("First level error managed by anyhow, filename=[{}]", filename)
        )?;
        Ok(())
    }

    #[test]
    fn test_two_level_of_error() {
        init();
        let project_id = "6a3b9f2c";
        let path = "notebooks";
        let r = open_file_with_err().map_err(err_fwd!("Project : {} - Second level of error by anyhow, path=[{}]",
                            project_id, &path) );
        assert!(r.is_err());
    }

    fn meant_to_crash() -> anyhow::Result<i32> {
        let mut m : HashMap<i32,i32> = HashMap::new();
        m.insert(0, 6);
        let r = m.get(&0).ok_or(anyhow::anyhow!("Error : Missing item 0"))?;
        let _ = m.get(&1).ok_or(anyhow::anyhow!("Error : Missing item 1"))?;
        Ok(*r)
    }

    fn middle_level_routine() -> anyhow::Result<i32> {
        // the middle level only forwards with tr_fwd to keep the line number trail.
        let r = meant_to_crash().map_err(tr_fwd!())?;
        Ok(r)
    }

    #[test]
    fn multi_level_error() {
        init();
        let project_id = "6a3b9f2c";
        let r = middle_level_routine().map_err(err_fwd!("Project : {} - Cannot read the internal map", project_id));
        assert!(r.is_err());
    }

    #[test]
    fn eprint_forward_keeps_the_error() {
        let r: Result<(), &str> = Err("runtime unreachable").map_err(eprint_fwd!("Listing fetch failed"));
        assert_eq!(Err("runtime unreachable"), r);
    }
}
