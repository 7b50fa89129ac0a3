use std::io;

use crate::error::ConfigError;

/// Where worker threads are placed.
///
/// Worker `i` goes to CPU `offset + i % physical_cpus()`, so with
/// hyper-threading only one logical CPU per core is used before wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuLayout {
    pub offset: usize,
    /// Logical CPUs per physical core.
    pub smt_ratio: usize,
    /// Overrides the detected logical CPU count.
    pub logical_cpus: Option<usize>,
    pub pin: bool,
}

impl Default for CpuLayout {
    fn default() -> Self {
        Self {
            offset: 0,
            smt_ratio: 2,
            logical_cpus: None,
            pin: true,
        }
    }
}

impl CpuLayout {
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn smt_ratio(mut self, smt_ratio: usize) -> Self {
        self.smt_ratio = smt_ratio;
        self
    }

    pub fn logical_cpus(mut self, logical_cpus: usize) -> Self {
        self.logical_cpus = Some(logical_cpus);
        self
    }

    pub fn pin(mut self, pin: bool) -> Self {
        self.pin = pin;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smt_ratio == 0 {
            return Err(ConfigError::InvalidSmtRatio);
        }
        Ok(())
    }

    pub fn physical_cpus(&self) -> usize {
        let logical = self.logical_cpus.unwrap_or_else(logical_cpus);
        (logical / self.smt_ratio.max(1)).max(1)
    }

    pub fn cpu_for(&self, worker: usize) -> usize {
        self.offset + worker % self.physical_cpus()
    }
}

/// Online logical CPUs, at least 1.
pub fn logical_cpus() -> usize {
    #[cfg(target_os = "linux")]
    {
        let online = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        if online > 0 {
            return online as usize;
        }
    }
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Restricts the calling thread to `cpu`.
#[cfg(target_os = "linux")]
pub fn pin_current_thread(cpu: usize) -> io::Result<()> {
    if cpu >= libc::CPU_SETSIZE as usize {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cpu {} exceeds the affinity mask", cpu),
        ));
    }

    unsafe {
        let mut mask: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut mask);
        libc::CPU_SET(cpu, &mut mask);
        let size = std::mem::size_of::<libc::cpu_set_t>();
        if libc::sched_setaffinity(0, size, &mask) != 0 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

#[cfg(not(target_os = "linux"))]
pub fn pin_current_thread(_cpu: usize) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "thread pinning is only available on linux",
    ))
}

/// The CPU the calling thread is running on right now.
#[cfg(target_os = "linux")]
pub fn current_cpu() -> Option<usize> {
    let cpu = unsafe { libc::sched_getcpu() };
    usize::try_from(cpu).ok()
}

#[cfg(not(target_os = "linux"))]
pub fn current_cpu() -> Option<usize> {
    None
}
