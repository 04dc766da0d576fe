#[macro_export]
macro_rules! cond_println {
    ($cond_expr: expr; $($args:tt)* ) => {
        if $cond_expr {
            println!($($args)*)
        }
    };
}

#[macro_export]
macro_rules! cond_eprintln {
    ($cond_expr: expr; $($args:tt)* ) => {
        if $cond_expr {
            eprintln!($($args)*)
        }
    };
}

/// Logs through the facade when `$level` is enabled and `$cond_expr`
/// holds; the condition is usually `comm.is_root()`.
#[macro_export]
macro_rules! cond_log {
    ($cond_expr: expr; $level: expr; $($args:tt)* ) => {
        if ::log::log_enabled!($level) && $cond_expr {
            ::log::log!($level, $($args)*)
        }
    };
}

#[macro_export]
macro_rules! cond_info {
    ($cond_expr: expr; $($args:tt)* ) => {
        $crate::cond_log!($cond_expr; ::log::Level::Info; $($args)*)
    };
}

#[macro_export]
macro_rules! cond_error {
    ($cond_expr: expr; $($args:tt)* ) => {
        $crate::cond_log!($cond_expr; ::log::Level::Error; $($args)*)
    };
}

#[macro_export]
macro_rules! cond_debug {
    ($cond_expr: expr; $($args:tt)* ) => {
        $crate::cond_log!($cond_expr; ::log::Level::Debug; $($args)*)
    };
}

#[macro_export]
macro_rules! cond_warn {
    ($cond_expr: expr; $($args:tt)* ) => {
        $crate::cond_log!($cond_expr; ::log::Level::Warn; $($args)*)
    };
}

/// Formats one line on every rank, tags it with `[rank::timestamp]`,
/// and gathers the non-empty lines at rank 0.
#[macro_export]
macro_rules! gather_format_vec {
    ($comm_expr: expr; $($args:tt)* ) => {{
        use $crate::comm::Comm;
        let line = format!($($args)*);
        let tagged = if line.is_empty() {
            line
        } else {
            format!(
                "[{}::{}] {}",
                ($comm_expr).rank(),
                ::chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                line
            )
        };
        $crate::collective::gather_strings(tagged, 0, ($comm_expr))
    }};
}

#[macro_export]
macro_rules! log_gather_format_vec {
    ($comm_expr: expr; $level: expr; $($args:tt)* ) => {
        if ::log::log_enabled!($level) {
            $crate::gather_format_vec!($comm_expr; $($args)*).unwrap_or_else(
                |err| {
                    use $crate::comm::Comm;
                    (($comm_expr).rank() == 0).then(|| vec![err.to_string()])
                },
            )
        } else {
            None
        }
    };
}

#[macro_export]
macro_rules! gather_format {
    ($comm_expr: expr; $($args:tt)* ) => {
        $crate::gather_format_vec!($comm_expr; $($args)*).map_or_else(
            |err| Some(err.to_string()),
            |lines| lines.map(|sv| sv.join("\n")),
        )
    };
}

#[macro_export]
macro_rules! gather_println {
    ($comm_expr: expr; $($args:tt)* ) => {
        if let Some(report) = $crate::gather_format!($comm_expr; $($args)*) {
            println!("{}", report);
        }
    };
}

/// One facade record per gathered line, at rank 0 only.
#[macro_export]
macro_rules! gather_log {
    ($comm_expr: expr; $level: expr; $($args:tt)* ) => {
        if let Some(lines) =
            $crate::log_gather_format_vec!($comm_expr; $level; $($args)*)
        {
            for line in lines {
                ::log::log!($level, "{}", line);
            }
        }
    };
}

#[macro_export]
macro_rules! gather_info {
    ($comm_expr: expr; $($args:tt)* ) => {
        $crate::gather_log!($comm_expr; ::log::Level::Info; $($args)*)
    };
}

#[macro_export]
macro_rules! gather_error {
    ($comm_expr: expr; $($args:tt)* ) => {
        $crate::gather_log!($comm_expr; ::log::Level::Error; $($args)*)
    };
}
